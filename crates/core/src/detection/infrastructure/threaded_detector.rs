use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{SendError, Sender};

use crate::detection::domain::detector_port::{
    DetectionOutcome, DetectorPort, FaceAttributeDetector,
};
use crate::shared::completion::Completion;
use crate::shared::oriented_frame::OrientedFrame;

struct DetectionJob {
    frame: Arc<OrientedFrame>,
    done: Completion<DetectionOutcome>,
}

/// Runs a synchronous [`FaceAttributeDetector`] on a dedicated worker thread.
///
/// Submissions queue on a channel and are processed one at a time, so
/// results come back in submission order. Every submission completes, even
/// when the inner detector errors or panics.
pub struct ThreadedDetector {
    jobs: Option<Sender<DetectionJob>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ThreadedDetector {
    pub fn spawn(mut inner: Box<dyn FaceAttributeDetector>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded::<DetectionJob>();

        let worker = thread::Builder::new()
            .name("face-detector".into())
            .spawn(move || {
                for job in rx {
                    let outcome = run_detection(&mut *inner, &job.frame);
                    job.done.complete(outcome);
                }
            })
            .ok();
        if worker.is_none() {
            log::error!("Failed to spawn face detector thread");
        }

        Self {
            jobs: worker.as_ref().map(|_| tx),
            worker,
        }
    }
}

fn run_detection(inner: &mut dyn FaceAttributeDetector, frame: &OrientedFrame) -> DetectionOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| inner.detect(frame))) {
        Ok(Ok(faces)) => DetectionOutcome::Faces(faces),
        Ok(Err(e)) => DetectionOutcome::Failure(e.to_string()),
        Err(_) => DetectionOutcome::Failure("face detector panicked".into()),
    }
}

impl DetectorPort for ThreadedDetector {
    fn submit(&mut self, frame: Arc<OrientedFrame>, done: Completion<DetectionOutcome>) {
        let job = DetectionJob { frame, done };
        let rejected = match &self.jobs {
            Some(tx) => match tx.send(job) {
                Ok(()) => None,
                Err(SendError(job)) => Some(job),
            },
            None => Some(job),
        };
        if let Some(job) = rejected {
            job.done
                .complete(DetectionOutcome::Failure("face detector is not running".into()));
        }
    }
}

impl Drop for ThreadedDetector {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Face detector thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detected_face::DetectedFace;
    use crate::imaging::domain::frame_rotator::Rotation;
    use crate::shared::camera_selector::CameraSelector;
    use crate::shared::frame::Frame;
    use std::time::Duration;

    const WAIT: Duration = Duration::from_secs(5);

    /// Reports one face per call whose smile probability encodes the frame index.
    struct IndexEchoDetector;

    impl FaceAttributeDetector for IndexEchoDetector {
        fn detect(
            &mut self,
            frame: &OrientedFrame,
        ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error + Send + Sync>> {
            let index = frame.frame().index();
            if index == 99 {
                return Err("bad frame".into());
            }
            if index == 666 {
                panic!("detector blew up");
            }
            Ok(vec![DetectedFace::new().with_smiling(index as f32 / 10.0)])
        }
    }

    fn frame(index: u64) -> Arc<OrientedFrame> {
        Arc::new(OrientedFrame::new(
            Frame::new(vec![0u8; 12], 2, 2, 3, index),
            CameraSelector::Front,
            Rotation::Clockwise270,
        ))
    }

    fn submit_all(detector: &mut ThreadedDetector, indices: &[u64]) -> Vec<DetectionOutcome> {
        let (tx, rx) = crossbeam_channel::unbounded();
        for &index in indices {
            let tx = tx.clone();
            detector.submit(
                frame(index),
                Completion::new(move |outcome| {
                    let _ = tx.send(outcome);
                }),
            );
        }
        indices
            .iter()
            .map(|_| rx.recv_timeout(WAIT).unwrap())
            .collect()
    }

    #[test]
    fn test_results_arrive_in_submission_order() {
        let mut detector = ThreadedDetector::spawn(Box::new(IndexEchoDetector));

        let outcomes = submit_all(&mut detector, &[1, 2, 3]);

        let smiles: Vec<_> = outcomes
            .into_iter()
            .map(|o| match o {
                DetectionOutcome::Faces(faces) => faces[0].smiling.unwrap(),
                DetectionOutcome::Failure(e) => panic!("unexpected failure: {e}"),
            })
            .collect();
        assert_eq!(smiles, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_detector_error_becomes_failure() {
        let mut detector = ThreadedDetector::spawn(Box::new(IndexEchoDetector));

        let outcomes = submit_all(&mut detector, &[99]);

        assert_eq!(outcomes[0], DetectionOutcome::Failure("bad frame".into()));
    }

    #[test]
    fn test_panic_becomes_failure_and_worker_survives() {
        let mut detector = ThreadedDetector::spawn(Box::new(IndexEchoDetector));

        let outcomes = submit_all(&mut detector, &[666, 4]);

        assert!(matches!(outcomes[0], DetectionOutcome::Failure(_)));
        assert!(matches!(outcomes[1], DetectionOutcome::Faces(_)));
    }
}
