use ndarray::Axis;

use crate::imaging::domain::frame_rotator::{FrameRotator, Rotation};
use crate::shared::frame::Frame;

/// Exact right-angle rotation by permuting the `(row, col, channel)` view.
///
/// Clockwise 90°: transpose, then mirror columns.
/// Clockwise 270°: transpose, then mirror rows.
pub struct NdarrayFrameRotator;

impl NdarrayFrameRotator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NdarrayFrameRotator {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRotator for NdarrayFrameRotator {
    fn rotate(&self, frame: Frame, rotation: Rotation) -> Frame {
        let data: Vec<u8> = {
            let mut view = frame.as_ndarray();
            view.swap_axes(0, 1);
            match rotation {
                Rotation::Clockwise90 => view.invert_axis(Axis(1)),
                Rotation::Clockwise270 => view.invert_axis(Axis(0)),
            }
            view.iter().copied().collect()
        };

        Frame::new(
            data,
            frame.height(),
            frame.width(),
            frame.channels(),
            frame.index(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3 wide x 2 tall, single channel:
    // 1 2 3
    // 4 5 6
    fn grid() -> Frame {
        Frame::new(vec![1, 2, 3, 4, 5, 6], 3, 2, 1, 9)
    }

    #[test]
    fn test_clockwise_90() {
        // 4 1
        // 5 2
        // 6 3
        let rotated = NdarrayFrameRotator::new().rotate(grid(), Rotation::Clockwise90);
        assert_eq!(rotated.width(), 2);
        assert_eq!(rotated.height(), 3);
        assert_eq!(rotated.data(), &[4, 1, 5, 2, 6, 3]);
    }

    #[test]
    fn test_clockwise_270() {
        // 3 6
        // 2 5
        // 1 4
        let rotated = NdarrayFrameRotator::new().rotate(grid(), Rotation::Clockwise270);
        assert_eq!(rotated.width(), 2);
        assert_eq!(rotated.height(), 3);
        assert_eq!(rotated.data(), &[3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn test_90_then_270_round_trips() {
        let rotator = NdarrayFrameRotator::new();
        let back = rotator.rotate(
            rotator.rotate(grid(), Rotation::Clockwise90),
            Rotation::Clockwise270,
        );
        assert_eq!(back, grid());
    }

    #[test]
    fn test_keeps_channel_triples_together() {
        // 2x1 RGB: red then blue; clockwise 90 puts red on top
        let frame = Frame::new(vec![255, 0, 0, 0, 0, 255], 2, 1, 3, 0);
        let rotated = NdarrayFrameRotator::new().rotate(frame, Rotation::Clockwise90);
        assert_eq!(rotated.pixel(0, 0), Some(&[255u8, 0, 0][..]));
        assert_eq!(rotated.pixel(0, 1), Some(&[0u8, 0, 255][..]));
    }

    #[test]
    fn test_preserves_index() {
        let rotated = NdarrayFrameRotator::new().rotate(grid(), Rotation::Clockwise270);
        assert_eq!(rotated.index(), 9);
    }
}
