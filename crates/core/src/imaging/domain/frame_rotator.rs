use crate::shared::camera_selector::CameraSelector;
use crate::shared::frame::Frame;

/// Clockwise correction applied to a sensor image to make it upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise90,
    Clockwise270,
}

impl Rotation {
    /// Sensor mounting is fixed per camera: front needs 270°, back 90°.
    pub fn for_selector(selector: CameraSelector) -> Self {
        match selector {
            CameraSelector::Front => Rotation::Clockwise270,
            CameraSelector::Back => Rotation::Clockwise90,
        }
    }
}

/// Rotates decoded frames by right angles.
pub trait FrameRotator: Send {
    fn rotate(&self, frame: Frame, rotation: Rotation) -> Frame;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::front(CameraSelector::Front, Rotation::Clockwise270)]
    #[case::back(CameraSelector::Back, Rotation::Clockwise90)]
    fn test_rotation_for_selector(#[case] selector: CameraSelector, #[case] expected: Rotation) {
        assert_eq!(Rotation::for_selector(selector), expected);
    }
}
