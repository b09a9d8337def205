use thiserror::Error;

use crate::camera::domain::camera_session::SessionHandle;
use crate::camera::domain::raw_capture::RawCapture;
use crate::shared::camera_selector::CameraSelector;
use crate::shared::completion::Completion;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),
    #[error("no {0} camera found")]
    NotFound(CameraSelector),
    #[error("{0} camera has no frames to capture")]
    NoFrames(CameraSelector),
    #[error("camera session {0} is not previewing")]
    NotPreviewing(u64),
    #[error("unknown camera session {0}")]
    UnknownSession(u64),
    #[error("camera I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("camera device disconnected")]
    Disconnected,
}

/// Parameters for opening a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRequest {
    pub selector: CameraSelector,
    pub width: u32,
    pub height: u32,
}

/// Camera device capability consumed by the pipeline.
///
/// Asynchronous operations report through a [`Completion`]; implementations
/// do their device work on their own threads and must not block the caller.
/// At most one still capture is outstanding per session.
pub trait CameraPort: Send {
    fn open(
        &mut self,
        request: OpenRequest,
        done: Completion<Result<SessionHandle, CameraError>>,
    );

    /// Starts the continuous preview stream feeding the render surface.
    fn start_preview(&mut self, session: &SessionHandle) -> Result<(), CameraError>;

    fn stop_preview(&mut self, session: &SessionHandle);

    fn request_still_capture(
        &mut self,
        session: &SessionHandle,
        done: Completion<Result<RawCapture, CameraError>>,
    );

    /// Releases the device. Consumes the handle so it cannot be used again.
    fn close(&mut self, session: SessionHandle, done: Completion<()>);
}
