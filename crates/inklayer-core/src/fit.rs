//! Canvas fit: resize the canvas around the dominant layer.

use crate::layer::{LayerId, LayerManager};
use kurbo::Vec2;

/// Result of a fit pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    /// The layer the canvas was fitted around.
    pub dominant: LayerId,
    /// New canvas dimensions.
    pub width: u32,
    pub height: u32,
}

/// Fit the canvas to the largest layer.
///
/// The dominant layer is the one with the largest rotated-bounds area; ties
/// go to the lowest z (strict `>` while scanning in z order). The canvas
/// becomes the ceiling of those bounds and the dominant layer is moved so its
/// bounds sit horizontally centered at the top edge. Other layers keep their
/// absolute positions. Returns `None` when there are no layers.
pub fn fit_canvas(layers: &mut LayerManager) -> Option<FitResult> {
    let dominant = layers
        .layers()
        .iter()
        .fold(None::<(LayerId, f64)>, |best, layer| {
            let bounds = layer.bounds();
            let area = bounds.width() * bounds.height();
            match best {
                Some((_, best_area)) if area <= best_area => best,
                _ => Some((layer.id(), area)),
            }
        })?
        .0;

    let bounds = layers.layer(dominant)?.bounds();
    let width = bounds.width().ceil() as u32;
    let height = bounds.height().ceil() as u32;

    // Center the dominant layer's bounds horizontally, flush to the top.
    let target_x = (width as f64 - bounds.width()) / 2.0;
    let delta = Vec2::new(target_x - bounds.x0, -bounds.y0);
    layers.translate(dominant, delta);

    log::debug!("canvas fitted to layer {dominant}: {width}x{height}");
    Some(FitResult {
        dominant,
        width,
        height,
    })
}
