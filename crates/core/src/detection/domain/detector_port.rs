use std::sync::Arc;

use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::completion::Completion;
use crate::shared::oriented_frame::OrientedFrame;

/// Result of one detector submission.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// Faces in detector order.
    Faces(Vec<DetectedFace>),
    Failure(String),
}

/// Asynchronous face detection capability consumed by the pipeline.
///
/// Each submission completes exactly once. Results are delivered in
/// submission order.
pub trait DetectorPort: Send {
    fn submit(&mut self, frame: Arc<OrientedFrame>, done: Completion<DetectionOutcome>);
}

/// Synchronous face attribute detection, run off the pipeline thread by an
/// adapter such as
/// [`ThreadedDetector`](crate::detection::infrastructure::threaded_detector::ThreadedDetector).
///
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceAttributeDetector: Send {
    fn detect(
        &mut self,
        frame: &OrientedFrame,
    ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error + Send + Sync>>;
}
