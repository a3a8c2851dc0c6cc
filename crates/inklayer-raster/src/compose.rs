//! CPU compositing of a session surface into an RGBA pixmap.
//!
//! Render order is fixed: layers in ascending z, then strokes in
//! chronological order, then (for display frames only) the selection
//! overlay. Pen strokes blend source-over; eraser strokes punch through
//! everything composed so far, layers included.

use crate::pixmap::Pixmap;
use inklayer_core::geometry::{world_to_local_delta, ANCHORS};
use inklayer_core::layer::{Layer, ANCHOR_HIT_TOLERANCE};
use inklayer_core::stroke::Stroke;
use inklayer_core::tools::BrushKind;
use inklayer_core::Surface;
use kurbo::Point;

/// Selection overlay accent.
const SELECTION: peniko::Color = peniko::Color::from_rgba8(59, 130, 246, 255);

/// Half-extent of the square corner handles, in canvas units.
const HANDLE_HALF: f64 = 5.0;

fn selection_rgba() -> [u8; 4] {
    let c = SELECTION.to_rgba8();
    [c.r, c.g, c.b, c.a]
}

/// Composite the surface without the selection overlay.
///
/// This is the export path: what `snapshot` encodes is exactly this.
pub fn compose(surface: &Surface) -> Pixmap {
    let mut pixmap = Pixmap::new(surface.width(), surface.height());
    for layer in surface.layers.layers() {
        draw_layer(&mut pixmap, layer);
    }
    for stroke in surface.strokes.strokes() {
        draw_stroke(&mut pixmap, stroke);
    }
    pixmap
}

/// Composite a display frame: `compose` plus the selection overlay on top.
pub fn compose_frame(surface: &Surface) -> Pixmap {
    let mut pixmap = compose(surface);
    if let Some(layer) = surface.layers.selected_layer() {
        draw_selection_overlay(&mut pixmap, layer);
    }
    pixmap
}

/// Draw one layer by inverse-mapping destination pixels into the image.
///
/// Nearest-neighbour sampling at pixel centers; a zero scale axis collapses
/// the layer to nothing and is skipped entirely.
fn draw_layer(pixmap: &mut Pixmap, layer: &Layer) {
    if layer.scale.x <= 0.0 || layer.scale.y <= 0.0 {
        return;
    }
    let bounds = layer.bounds();
    let x0 = bounds.x0.floor().max(0.0) as u32;
    let y0 = bounds.y0.floor().max(0.0) as u32;
    let x1 = (bounds.x1.ceil().max(0.0) as u32).min(pixmap.width());
    let y1 = (bounds.y1.ceil().max(0.0) as u32).min(pixmap.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let local = world_to_local_delta(center - layer.position, layer.rotation);
            let sx = local.x / layer.scale.x;
            let sy = local.y / layer.scale.y;
            if sx < 0.0 || sy < 0.0 {
                continue;
            }
            let (sx, sy) = (sx as u32, sy as u32);
            if let Some(rgba) = layer.image.pixel(sx, sy) {
                pixmap.blend_pixel(x, y, rgba);
            }
        }
    }
}

/// Draw one stroke as discs stamped along its polyline.
fn draw_stroke(pixmap: &mut Pixmap, stroke: &Stroke) {
    let radius = stroke.width / 2.0;
    let rgba = [stroke.color.r, stroke.color.g, stroke.color.b, 255];
    let mut stamp = |point: Point| match stroke.brush {
        BrushKind::Pen => stamp_disc(pixmap, point, radius, Some(rgba)),
        BrushKind::Eraser => stamp_disc(pixmap, point, radius, None),
    };

    let points = &stroke.points;
    stamp(points[0]);
    for pair in points.windows(2) {
        walk_segment(pair[0], pair[1], &mut stamp);
    }
}

/// Invoke `stamp` at ~1px intervals along the segment, endpoint included.
fn walk_segment(from: Point, to: Point, stamp: &mut impl FnMut(Point)) {
    let delta = to - from;
    let steps = delta.hypot().ceil().max(1.0) as usize;
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        stamp(Point::new(from.x + delta.x * t, from.y + delta.y * t));
    }
}

/// Fill a disc. `Some(rgba)` blends source-over, `None` erases.
fn stamp_disc(pixmap: &mut Pixmap, center: Point, radius: f64, rgba: Option<[u8; 4]>) {
    let r = radius.max(0.5);
    let x0 = (center.x - r).floor().max(0.0) as u32;
    let y0 = (center.y - r).floor().max(0.0) as u32;
    let x1 = ((center.x + r).ceil().max(0.0) as u32).min(pixmap.width());
    let y1 = ((center.y + r).ceil().max(0.0) as u32).min(pixmap.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            if dx * dx + dy * dy > r * r {
                continue;
            }
            match rgba {
                Some(rgba) => pixmap.blend_pixel(x, y, rgba),
                None => pixmap.erase_pixel(x, y),
            }
        }
    }
}

/// Border, corner handles, and rotation handle for the selected layer.
fn draw_selection_overlay(pixmap: &mut Pixmap, layer: &Layer) {
    let rgba = selection_rgba();
    let corners = ANCHORS.map(|anchor| layer.anchor_position(anchor));
    let [tl, tr, bl, br] = corners;

    let mut line = |from: Point, to: Point| {
        let mut stamp = |p: Point| stamp_disc(pixmap, p, 1.0, Some(rgba));
        stamp(from);
        walk_segment(from, to, &mut stamp);
    };
    line(tl, tr);
    line(tr, br);
    line(br, bl);
    line(bl, tl);

    for corner in corners {
        fill_square(pixmap, corner, HANDLE_HALF, rgba);
    }
    stamp_disc(
        pixmap,
        layer.rotate_handle_position(),
        ANCHOR_HIT_TOLERANCE / 2.0,
        Some(rgba),
    );
}

fn fill_square(pixmap: &mut Pixmap, center: Point, half: f64, rgba: [u8; 4]) {
    let x0 = (center.x - half).floor().max(0.0) as u32;
    let y0 = (center.y - half).floor().max(0.0) as u32;
    let x1 = ((center.x + half).ceil().max(0.0) as u32).min(pixmap.width());
    let y1 = ((center.y + half).ceil().max(0.0) as u32).min(pixmap.height());
    for y in y0..y1 {
        for x in x0..x1 {
            pixmap.blend_pixel(x, y, rgba);
        }
    }
}
