use crate::shared::camera_selector::CameraSelector;

/// Encoded still bytes together with the camera that produced them.
///
/// The selector travels with the buffer so orientation is decided by the
/// capturing camera, not by whatever camera is active when decoding runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCapture {
    bytes: Vec<u8>,
    selector: CameraSelector,
    sequence: u64,
}

impl RawCapture {
    pub fn new(bytes: Vec<u8>, selector: CameraSelector, sequence: u64) -> Self {
        Self {
            bytes,
            selector,
            sequence,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn selector(&self) -> CameraSelector {
        self.selector
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
