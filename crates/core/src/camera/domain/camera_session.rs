use crate::shared::camera_selector::CameraSelector;

/// Opaque handle to an open device and its streaming session.
///
/// Deliberately neither `Clone` nor `Copy`: whoever holds it owns the
/// session, and handing it to [`CameraPort::close`] ends it.
///
/// [`CameraPort::close`]: crate::camera::domain::camera_port::CameraPort::close
#[derive(Debug, PartialEq, Eq)]
pub struct SessionHandle {
    id: u64,
    selector: CameraSelector,
}

impl SessionHandle {
    pub fn new(id: u64, selector: CameraSelector) -> Self {
        Self { id, selector }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn selector(&self) -> CameraSelector {
        self.selector
    }
}
