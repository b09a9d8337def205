use crossbeam_channel::{Receiver, Sender};

use crate::pipeline::result_sink::{CycleResult, ResultSink};

/// Hands published results to another thread, typically the UI's.
pub struct ChannelResultSink {
    tx: Sender<CycleResult>,
}

impl ChannelResultSink {
    /// Creates the sink and the receiving end for the consumer.
    pub fn new() -> (Self, Receiver<CycleResult>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl ResultSink for ChannelResultSink {
    fn publish(&mut self, result: CycleResult) {
        if self.tx.send(result).is_err() {
            log::debug!("Result consumer went away; dropping cycle result");
        }
    }
}
