use crate::imaging::domain::still_decoder::StillDecoder;
use crate::shared::frame::Frame;

/// Decodes stills with the pure-Rust `image` crate.
///
/// The format is sniffed from the buffer's magic bytes, so any encoding the
/// crate was built with is accepted. Output is always 3-channel RGB.
pub struct ImageStillDecoder;

impl ImageStillDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageStillDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StillDecoder for ImageStillDecoder {
    fn decode(
        &self,
        bytes: &[u8],
        index: u64,
    ) -> Result<Frame, Box<dyn std::error::Error + Send + Sync>> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Frame::new(rgb.into_raw(), width, height, 3, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_decodes_png_to_rgb() {
        let bytes = encode(8, 6, image::ImageFormat::Png);
        let frame = ImageStillDecoder::new().decode(&bytes, 3).unwrap();
        assert_eq!(frame.width(), 8);
        assert_eq!(frame.height(), 6);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 3);
        assert_eq!(frame.pixel(0, 0), Some(&[50u8, 100, 200][..]));
    }

    #[test]
    fn test_decodes_jpeg_dimensions() {
        let bytes = encode(16, 12, image::ImageFormat::Jpeg);
        let frame = ImageStillDecoder::new().decode(&bytes, 0).unwrap();
        assert_eq!((frame.width(), frame.height()), (16, 12));
    }

    #[test]
    fn test_garbage_buffer_errors() {
        let result = ImageStillDecoder::new().decode(b"definitely not an image", 0);
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_png_errors() {
        let bytes = encode(8, 8, image::ImageFormat::Png);
        let result = ImageStillDecoder::new().decode(&bytes[..bytes.len() / 2], 0);
        assert!(result.is_err());
    }
}
