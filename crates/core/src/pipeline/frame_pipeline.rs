use thiserror::Error;

use crate::camera::domain::raw_capture::RawCapture;
use crate::imaging::domain::frame_rotator::{FrameRotator, Rotation};
use crate::imaging::domain::still_decoder::StillDecoder;
use crate::imaging::infrastructure::image_still_decoder::ImageStillDecoder;
use crate::imaging::infrastructure::ndarray_frame_rotator::NdarrayFrameRotator;
use crate::shared::oriented_frame::OrientedFrame;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("capture buffer is empty")]
    Empty,
    #[error("malformed still: {0}")]
    Malformed(String),
}

/// Raw capture → decode → orientation correction.
///
/// The rotation comes from the selector recorded in the capture itself, never
/// from live camera state.
pub struct FramePipeline {
    decoder: Box<dyn StillDecoder>,
    rotator: Box<dyn FrameRotator>,
}

impl FramePipeline {
    pub fn new(decoder: Box<dyn StillDecoder>, rotator: Box<dyn FrameRotator>) -> Self {
        Self { decoder, rotator }
    }

    pub fn decode(&self, capture: RawCapture) -> Result<OrientedFrame, DecodeError> {
        if capture.is_empty() {
            return Err(DecodeError::Empty);
        }
        let selector = capture.selector();
        let frame = self
            .decoder
            .decode(capture.bytes(), capture.sequence())
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let rotation = Rotation::for_selector(selector);
        let upright = self.rotator.rotate(frame, rotation);
        Ok(OrientedFrame::new(upright, selector, rotation))
    }
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self::new(
            Box::new(ImageStillDecoder::new()),
            Box::new(NdarrayFrameRotator::new()),
        )
    }
}
