//! PNG snapshots of the composed canvas, delivered as data URLs.

use crate::compose::compose;
use crate::pixmap::Pixmap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use inklayer_core::Surface;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot snapshot an empty surface")]
    EmptySurface,
    #[error("png encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Encode a pixmap as a PNG byte stream.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, SnapshotError> {
    if pixmap.width() == 0 || pixmap.height() == 0 {
        return Err(SnapshotError::EmptySurface);
    }
    let mut bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut bytes, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixmap.data())?;
    writer.finish()?;
    Ok(bytes)
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Snapshot the surface as a PNG data URL.
///
/// Composites without the selection overlay; the caller is responsible for
/// only invoking this on a frame where the overlay was already hidden.
pub fn snapshot(surface: &Surface) -> Result<String, SnapshotError> {
    let pixmap = compose(surface);
    Ok(to_data_url(&encode_png(&pixmap)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_image;
    use inklayer_core::ImageData;

    #[test]
    fn test_snapshot_is_png_data_url() {
        let surface = Surface::new(4, 4);
        let url = snapshot(&surface).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        // The payload decodes back to the canvas dimensions.
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let png = STANDARD.decode(payload).unwrap();
        let image = decode_image(&png).unwrap();
        assert_eq!((image.width, image.height), (4, 4));
    }

    #[test]
    fn test_zero_sized_surface_is_rejected() {
        let surface = Surface::new(0, 100);
        assert!(matches!(
            snapshot(&surface),
            Err(SnapshotError::EmptySurface)
        ));
    }

    #[test]
    fn test_snapshot_excludes_selection_overlay() {
        let mut with_selection = Surface::new(200, 200);
        let id = with_selection
            .layers
            .add_layer(ImageData::solid(100, 100, [255, 0, 0, 255]));
        with_selection.layers.select(Some(id));

        let mut without = with_selection.clone();
        without.layers.deselect_all();

        // Selection state never leaks into the export.
        assert_eq!(
            snapshot(&with_selection).unwrap(),
            snapshot(&without).unwrap()
        );
    }
}
