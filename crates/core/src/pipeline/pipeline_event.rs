use crate::camera::domain::camera_port::CameraError;
use crate::camera::domain::camera_session::SessionHandle;
use crate::camera::domain::raw_capture::RawCapture;
use crate::detection::domain::detector_port::DetectionOutcome;
use crate::shared::camera_selector::CameraSelector;

/// Identifies one open request and the session it produces.
///
/// Completions carry the token they were issued under; a completion whose
/// token is no longer current is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(pub u64);

/// Identifies one tick-triggered capture/detection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleId(pub u64);

/// User requests forwarded from the UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    SelectCamera(CameraSelector),
    ToggleCamera,
    Shutdown,
}

/// Everything that can change pipeline state, serialised onto one channel.
#[derive(Debug)]
pub enum PipelineEvent {
    Control(ControlCommand),
    Tick {
        session: SessionToken,
    },
    Opened {
        session: SessionToken,
        result: Result<SessionHandle, CameraError>,
    },
    Closed {
        session: SessionToken,
    },
    CaptureComplete {
        session: SessionToken,
        cycle: CycleId,
        result: Result<RawCapture, CameraError>,
    },
    DetectionComplete {
        session: SessionToken,
        cycle: CycleId,
        outcome: DetectionOutcome,
    },
}
