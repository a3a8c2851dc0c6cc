//! Geometry helpers for rotated layer frames.
//!
//! Layers rotate about their own origin (top-left corner), so every hit test,
//! bounding box, and anchor drag needs the same handful of conversions between
//! world space and the layer's local rotated frame. They live here as free
//! functions so both the session logic and the compositor use identical math.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Sine and cosine of an angle given in degrees.
///
/// Quarter turns are returned exactly so that right-angle bounding boxes (and
/// the fit engine's area tie-break) stay bit-deterministic instead of picking
/// up `sin(PI/2)` rounding noise.
pub fn sin_cos_deg(degrees: f64) -> (f64, f64) {
    let turn = degrees.rem_euclid(360.0);
    if turn == 0.0 {
        (0.0, 1.0)
    } else if turn == 90.0 {
        (1.0, 0.0)
    } else if turn == 180.0 {
        (0.0, -1.0)
    } else if turn == 270.0 {
        (-1.0, 0.0)
    } else {
        let radians = degrees.to_radians();
        (radians.sin(), radians.cos())
    }
}

/// Rotate a vector by an angle in degrees.
pub fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = sin_cos_deg(degrees);
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Map a world-space delta into a frame rotated by `degrees`.
pub fn world_to_local_delta(delta: Vec2, degrees: f64) -> Vec2 {
    rotate_vec(delta, -degrees)
}

/// Map a local-frame delta back into world space.
pub fn local_to_world_delta(delta: Vec2, degrees: f64) -> Vec2 {
    rotate_vec(delta, degrees)
}

/// Corner anchors of a layer's transform frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    /// The anchor that stays pinned while this one is dragged.
    pub fn opposite(self) -> Self {
        match self {
            Anchor::TopLeft => Anchor::BottomRight,
            Anchor::TopRight => Anchor::BottomLeft,
            Anchor::BottomLeft => Anchor::TopRight,
            Anchor::BottomRight => Anchor::TopLeft,
        }
    }

    /// Local-frame position of this anchor on a `width`x`height` rect.
    pub fn local_position(self, width: f64, height: f64) -> Point {
        match self {
            Anchor::TopLeft => Point::new(0.0, 0.0),
            Anchor::TopRight => Point::new(width, 0.0),
            Anchor::BottomLeft => Point::new(0.0, height),
            Anchor::BottomRight => Point::new(width, height),
        }
    }
}

/// All four anchors, in overlay drawing order.
pub const ANCHORS: [Anchor; 4] = [
    Anchor::TopLeft,
    Anchor::TopRight,
    Anchor::BottomLeft,
    Anchor::BottomRight,
];

/// World-space corners of a `width`x`height` rect anchored at `origin` and
/// rotated by `degrees` about that origin. Order: TL, TR, BL, BR.
pub fn transformed_corners(origin: Point, width: f64, height: f64, degrees: f64) -> [Point; 4] {
    let place = |x: f64, y: f64| -> Point {
        let v = rotate_vec(Vec2::new(x, y), degrees);
        Point::new(origin.x + v.x, origin.y + v.y)
    };
    [
        place(0.0, 0.0),
        place(width, 0.0),
        place(0.0, height),
        place(width, height),
    ]
}

/// Axis-aligned bounding rect of the rotated rect.
pub fn rotated_bounds(origin: Point, width: f64, height: f64, degrees: f64) -> Rect {
    let corners = transformed_corners(origin, width, height, degrees);
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for corner in corners {
        min_x = min_x.min(corner.x);
        min_y = min_y.min(corner.y);
        max_x = max_x.max(corner.x);
        max_y = max_y.max(corner.y);
    }
    Rect::new(min_x, min_y, max_x, max_y)
}

/// Test whether a world-space point lies inside the rotated rect.
pub fn rotated_rect_contains(
    origin: Point,
    width: f64,
    height: f64,
    degrees: f64,
    point: Point,
) -> bool {
    let local = world_to_local_delta(point - origin, degrees);
    local.x >= 0.0 && local.x <= width && local.y >= 0.0 && local.y <= height
}
