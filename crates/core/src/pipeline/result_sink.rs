use std::sync::Arc;

use crate::detection::domain::emotion_classifier::EmotionLabel;
use crate::shared::oriented_frame::OrientedFrame;

/// Aggregate output of one completed capture/detection cycle.
#[derive(Debug, Clone)]
pub struct CycleResult {
    pub display_frame: Arc<OrientedFrame>,
    pub face_count: usize,
    /// One label per face, in detector order.
    pub labels: Vec<EmotionLabel>,
}

impl CycleResult {
    /// Human-readable report, one line per face.
    pub fn report_lines(&self) -> Vec<String> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| format!("Face{}: Emotion - {label}", i + 1))
            .collect()
    }
}

/// Receives published results on the pipeline thread.
///
/// Implementations that drive a UI must marshal to their own render thread.
pub trait ResultSink: Send {
    fn publish(&mut self, result: CycleResult);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::domain::frame_rotator::Rotation;
    use crate::shared::camera_selector::CameraSelector;
    use crate::shared::frame::Frame;

    #[test]
    fn test_report_lines_are_numbered_from_one() {
        let result = CycleResult {
            display_frame: Arc::new(OrientedFrame::new(
                Frame::new(vec![0u8; 3], 1, 1, 3, 0),
                CameraSelector::Front,
                Rotation::Clockwise270,
            )),
            face_count: 3,
            labels: vec![
                EmotionLabel::Happy(0.8),
                EmotionLabel::Sleepy(0.2),
                EmotionLabel::Neutral,
            ],
        };

        assert_eq!(
            result.report_lines(),
            vec![
                "Face1: Emotion - Happy 0.80",
                "Face2: Emotion - Sleepy 0.20",
                "Face3: Emotion - Neutral",
            ]
        );
    }
}
