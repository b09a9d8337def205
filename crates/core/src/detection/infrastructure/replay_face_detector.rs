use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::detector_options::DetectorOptions;
use crate::detection::domain::detector_port::FaceAttributeDetector;
use crate::shared::oriented_frame::OrientedFrame;

#[derive(Error, Debug)]
pub enum ReplayScriptError {
    #[error("failed to read detection script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid detection script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One scripted detector response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayEntry {
    Faces(Vec<DetectedFace>),
    Failure { error: String },
}

/// Replays pre-recorded detection results, one script entry per call.
///
/// The script wraps around when exhausted; an empty script reports no
/// faces. Script format (JSON):
///
/// ```json
/// [[{"smiling": 0.8}, {"left_eye_open": 0.2, "right_eye_open": 0.1}],
///  {"error": "model busy"},
///  []]
/// ```
pub struct ReplayFaceDetector {
    script: Vec<ReplayEntry>,
    options: DetectorOptions,
    calls: usize,
}

impl ReplayFaceDetector {
    pub fn new(script: Vec<ReplayEntry>, options: DetectorOptions) -> Self {
        log::info!(
            "Replay detector: {} entries, {:?} mode, landmarks {:?}, classification {:?}",
            script.len(),
            options.performance_mode,
            options.landmark_mode,
            options.classification_mode
        );
        Self {
            script,
            options,
            calls: 0,
        }
    }

    pub fn from_json_str(json: &str, options: DetectorOptions) -> Result<Self, ReplayScriptError> {
        let script: Vec<ReplayEntry> = serde_json::from_str(json)?;
        Ok(Self::new(script, options))
    }

    pub fn from_json_file(path: &Path, options: DetectorOptions) -> Result<Self, ReplayScriptError> {
        let json = fs::read_to_string(path).map_err(|source| ReplayScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json, options)
    }
}

impl FaceAttributeDetector for ReplayFaceDetector {
    fn detect(
        &mut self,
        _frame: &OrientedFrame,
    ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error + Send + Sync>> {
        if self.script.is_empty() {
            return Ok(Vec::new());
        }
        let entry = &self.script[self.calls % self.script.len()];
        self.calls += 1;

        match entry {
            ReplayEntry::Faces(faces) if self.options.classifies() => Ok(faces.clone()),
            ReplayEntry::Faces(faces) => {
                Ok(vec![DetectedFace::default(); faces.len()])
            }
            ReplayEntry::Failure { error } => Err(error.clone().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detector_options::ClassificationMode;
    use crate::imaging::domain::frame_rotator::Rotation;
    use crate::shared::camera_selector::CameraSelector;
    use crate::shared::frame::Frame;

    const SCRIPT: &str = r#"[
        [{"smiling": 0.8}, {"leftEyeOpen": 0.2, "rightEyeOpen": 0.1}],
        {"error": "model busy"},
        []
    ]"#;

    fn frame() -> OrientedFrame {
        OrientedFrame::new(
            Frame::new(vec![0u8; 3], 1, 1, 3, 0),
            CameraSelector::Back,
            Rotation::Clockwise90,
        )
    }

    #[test]
    fn test_replays_entries_in_order_and_wraps() {
        let mut detector =
            ReplayFaceDetector::from_json_str(SCRIPT, DetectorOptions::default()).unwrap();

        let first = detector.detect(&frame()).unwrap();
        let second = detector.detect(&frame());
        let third = detector.detect(&frame()).unwrap();
        let fourth = detector.detect(&frame()).unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].smiling, Some(0.8));
        assert_eq!(first[1].left_eye_open, Some(0.2));
        assert_eq!(second.unwrap_err().to_string(), "model busy");
        assert!(third.is_empty());
        assert_eq!(fourth, first);
    }

    #[test]
    fn test_classification_off_strips_probabilities() {
        let options = DetectorOptions {
            classification_mode: ClassificationMode::None,
            ..DetectorOptions::default()
        };
        let mut detector = ReplayFaceDetector::from_json_str(SCRIPT, options).unwrap();

        let faces = detector.detect(&frame()).unwrap();

        assert_eq!(faces.len(), 2);
        assert!(faces.iter().all(|f| *f == DetectedFace::default()));
    }

    #[test]
    fn test_empty_script_reports_no_faces() {
        let mut detector = ReplayFaceDetector::new(Vec::new(), DetectorOptions::default());
        assert!(detector.detect(&frame()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = ReplayFaceDetector::from_json_str("{not json", DetectorOptions::default());
        assert!(matches!(result, Err(ReplayScriptError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = ReplayFaceDetector::from_json_file(
            Path::new("/nonexistent/script.json"),
            DetectorOptions::default(),
        );
        assert!(matches!(result, Err(ReplayScriptError::Read { .. })));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        fs::write(&path, SCRIPT).unwrap();

        let mut detector =
            ReplayFaceDetector::from_json_file(&path, DetectorOptions::default()).unwrap();

        assert_eq!(detector.detect(&frame()).unwrap().len(), 2);
    }
}
