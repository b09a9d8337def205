pub mod image_still_decoder;
pub mod ndarray_frame_rotator;
