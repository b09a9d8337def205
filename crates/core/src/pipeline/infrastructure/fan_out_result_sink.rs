use crate::pipeline::result_sink::{CycleResult, ResultSink};

/// Publishes every result to each inner sink, in order.
pub struct FanOutResultSink {
    sinks: Vec<Box<dyn ResultSink>>,
}

impl FanOutResultSink {
    pub fn new(sinks: Vec<Box<dyn ResultSink>>) -> Self {
        Self { sinks }
    }
}

impl ResultSink for FanOutResultSink {
    fn publish(&mut self, result: CycleResult) {
        let Some((last, rest)) = self.sinks.split_last_mut() else {
            return;
        };
        for sink in rest {
            sink.publish(result.clone());
        }
        last.publish(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::domain::frame_rotator::Rotation;
    use crate::pipeline::infrastructure::channel_result_sink::ChannelResultSink;
    use crate::pipeline::infrastructure::logging_result_sink::LoggingResultSink;
    use crate::shared::camera_selector::CameraSelector;
    use crate::shared::frame::Frame;
    use crate::shared::oriented_frame::OrientedFrame;
    use std::sync::Arc;

    fn result(face_count: usize) -> CycleResult {
        CycleResult {
            display_frame: Arc::new(OrientedFrame::new(
                Frame::new(vec![0; 3], 1, 1, 3, 0),
                CameraSelector::Front,
                Rotation::Clockwise270,
            )),
            face_count,
            labels: Vec::new(),
        }
    }

    #[test]
    fn test_every_sink_sees_every_result() {
        let (first, first_rx) = ChannelResultSink::new();
        let (second, second_rx) = ChannelResultSink::new();
        let mut sink = FanOutResultSink::new(vec![
            Box::new(first),
            Box::new(LoggingResultSink),
            Box::new(second),
        ]);

        sink.publish(result(1));
        sink.publish(result(2));

        for rx in [first_rx, second_rx] {
            let counts: Vec<_> = rx.try_iter().map(|r| r.face_count).collect();
            assert_eq!(counts, vec![1, 2]);
        }
    }

    #[test]
    fn test_shares_one_display_frame() {
        let (first, first_rx) = ChannelResultSink::new();
        let (second, second_rx) = ChannelResultSink::new();
        let mut sink = FanOutResultSink::new(vec![Box::new(first), Box::new(second)]);

        sink.publish(result(0));

        let a = first_rx.try_recv().unwrap();
        let b = second_rx.try_recv().unwrap();
        assert!(Arc::ptr_eq(&a.display_frame, &b.display_frame));
    }

    #[test]
    fn test_empty_fan_out_is_a_noop() {
        FanOutResultSink::new(Vec::new()).publish(result(3));
    }
}
