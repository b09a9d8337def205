use crate::shared::frame::Frame;

/// Turns a camera's native still encoding (JPEG, PNG, ...) into an RGB frame.
pub trait StillDecoder: Send {
    fn decode(
        &self,
        bytes: &[u8],
        index: u64,
    ) -> Result<Frame, Box<dyn std::error::Error + Send + Sync>>;
}
