//! Decoding host-provided image bytes into layer image data.

use inklayer_core::ImageData;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has zero dimensions")]
    Empty,
}

/// Decode encoded image bytes (PNG, JPEG, WebP) into RGBA8 image data.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData, DecodeError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty);
    }
    Ok(ImageData::new(width, height, decoded.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::encode_png;
    use crate::Pixmap;

    #[test]
    fn test_decode_round_trips_png() {
        let mut pixmap = Pixmap::new(3, 2);
        pixmap.blend_pixel(1, 1, [12, 34, 56, 255]);
        let png = encode_png(&pixmap).unwrap();

        let image = decode_image(&png).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.pixel(1, 1), Some([12, 34, 56, 255]));
        assert_eq!(image.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(DecodeError::Image(_))
        ));
    }
}
