/// Time between still captures.
pub const DEFAULT_CAPTURE_INTERVAL_MS: u64 = 5000;

pub const DEFAULT_CAPTURE_WIDTH: u32 = 640;
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 480;

/// A smile probability must exceed this (strictly) to read as happy.
pub const HAPPY_SMILE_THRESHOLD: f32 = 0.5;

/// Both eye-open probabilities must fall below this to read as sleepy.
pub const SLEEPY_EYE_OPEN_THRESHOLD: f32 = 0.5;

/// How long the runtime keeps draining after shutdown while an open is in flight.
pub const SHUTDOWN_GRACE_MS: u64 = 2000;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
