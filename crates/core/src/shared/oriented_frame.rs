use crate::imaging::domain::frame_rotator::Rotation;
use crate::shared::camera_selector::CameraSelector;
use crate::shared::frame::Frame;

/// An upright, decoded capture ready for inference and display.
#[derive(Clone, Debug, PartialEq)]
pub struct OrientedFrame {
    frame: Frame,
    source: CameraSelector,
    rotation: Rotation,
}

impl OrientedFrame {
    pub fn new(frame: Frame, source: CameraSelector, rotation: Rotation) -> Self {
        Self {
            frame,
            source,
            rotation,
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Camera that produced the capture.
    pub fn source(&self) -> CameraSelector {
        self.source
    }

    /// Correction applied to the sensor image.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }
}
