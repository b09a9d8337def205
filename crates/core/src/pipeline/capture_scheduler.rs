use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::pipeline::pipeline_event::{PipelineEvent, SessionToken};

/// Posts tick events for one streaming session onto the pipeline channel.
#[derive(Clone, Debug)]
pub struct Ticker {
    events: Sender<PipelineEvent>,
    session: SessionToken,
}

impl Ticker {
    pub fn new(events: Sender<PipelineEvent>, session: SessionToken) -> Self {
        Self { events, session }
    }

    /// Returns `false` once the pipeline has stopped listening.
    pub fn fire(&self) -> bool {
        self.events
            .send(PipelineEvent::Tick {
                session: self.session,
            })
            .is_ok()
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }
}

/// Recurring timer driving still captures.
pub trait TickScheduler: Send {
    /// Starts firing `ticker` every `interval`, replacing any running timer.
    fn start(&mut self, interval: Duration, ticker: Ticker);

    /// Cancels the timer. Idempotent.
    fn stop(&mut self);
}

/// Fixed-rate scheduler on a dedicated timer thread.
///
/// The timer re-arms itself as soon as it fires; it never waits for the
/// work a tick triggers. Ticks land on the pipeline channel, so they are
/// handled on the pipeline's own thread.
pub struct CaptureScheduler {
    stop_tx: Option<Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl CaptureScheduler {
    pub fn new() -> Self {
        Self {
            stop_tx: None,
            worker: None,
        }
    }
}

impl Default for CaptureScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler for CaptureScheduler {
    fn start(&mut self, interval: Duration, ticker: Ticker) {
        self.stop();
        if interval.is_zero() {
            log::error!("Capture interval must be non-zero; scheduler not started");
            return;
        }

        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let spawned = thread::Builder::new()
            .name("capture-scheduler".into())
            .spawn(move || {
                let ticks = crossbeam_channel::tick(interval);
                loop {
                    crossbeam_channel::select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticks) -> _ => {
                            if !ticker.fire() {
                                break;
                            }
                        }
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                self.stop_tx = Some(stop_tx);
                self.worker = Some(handle);
            }
            Err(e) => log::error!("Failed to spawn capture scheduler: {e}"),
        }
    }

    fn stop(&mut self) {
        // Dropping the sender disconnects `stop_rx`, which wakes the timer thread.
        drop(self.stop_tx.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Capture scheduler thread panicked");
            }
        }
    }
}

impl Drop for CaptureScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn ticker() -> (Ticker, crossbeam_channel::Receiver<PipelineEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Ticker::new(tx, SessionToken(7)), rx)
    }

    #[test]
    fn test_fires_repeatedly_at_interval() {
        let (ticker, rx) = ticker();
        let mut scheduler = CaptureScheduler::new();
        let started = Instant::now();

        scheduler.start(Duration::from_millis(20), ticker);
        for _ in 0..3 {
            let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(matches!(
                event,
                PipelineEvent::Tick {
                    session: SessionToken(7)
                }
            ));
        }
        scheduler.stop();

        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_zero_interval_never_fires() {
        let (ticker, rx) = ticker();
        let mut scheduler = CaptureScheduler::new();
        scheduler.start(Duration::ZERO, ticker);

        assert!(scheduler.worker.is_none());
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_no_ticks_after_stop() {
        let (ticker, rx) = ticker();
        let mut scheduler = CaptureScheduler::new();
        scheduler.start(Duration::from_millis(10), ticker);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        scheduler.stop();
        while rx.try_recv().is_ok() {}

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert!(scheduler.worker.is_none());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut scheduler = CaptureScheduler::new();
        scheduler.stop();
        let (ticker, _rx) = ticker();
        scheduler.start(Duration::from_secs(60), ticker);
        scheduler.stop();
        scheduler.stop();
        assert!(scheduler.worker.is_none());
    }

    #[test]
    fn test_restart_replaces_previous_timer() {
        let (first, first_rx) = ticker();
        let (tx, second_rx) = crossbeam_channel::unbounded();
        let second = Ticker::new(tx, SessionToken(8));
        let mut scheduler = CaptureScheduler::new();

        scheduler.start(Duration::from_millis(10), first);
        scheduler.start(Duration::from_millis(10), second);
        while first_rx.try_recv().is_ok() {}

        assert!(second_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert!(first_rx.recv_timeout(Duration::from_millis(50)).is_err());
        scheduler.stop();
    }

    #[test]
    fn test_timer_exits_when_pipeline_stops_listening() {
        let (ticker, rx) = ticker();
        let mut scheduler = CaptureScheduler::new();
        scheduler.start(Duration::from_millis(5), ticker);
        drop(rx);
        // Join must not hang: the thread exits on the failed send.
        scheduler.stop();
    }
}
