use thiserror::Error;

use crate::shared::camera_selector::CameraSelector;

/// Failures the pipeline reports and recovers from locally.
///
/// None of these is escalated: each leaves the controller in a stable state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("camera permission denied for {selector} camera: {reason}")]
    PermissionDenied {
        selector: CameraSelector,
        reason: String,
    },
    #[error("failed to open {selector} camera: {reason}")]
    DeviceOpenFailed {
        selector: CameraSelector,
        reason: String,
    },
    #[error("still capture failed: {reason}")]
    CaptureFailed { reason: String },
    #[error("failed to decode capture: {reason}")]
    DecodeFailed { reason: String },
    #[error("face detection failed: {reason}")]
    DetectionFailed { reason: String },
}

impl PipelineError {
    /// Stable name used for counting and log filtering.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::PermissionDenied { .. } => "permission_denied",
            PipelineError::DeviceOpenFailed { .. } => "device_open_failed",
            PipelineError::CaptureFailed { .. } => "capture_failed",
            PipelineError::DecodeFailed { .. } => "decode_failed",
            PipelineError::DetectionFailed { .. } => "detection_failed",
        }
    }
}
