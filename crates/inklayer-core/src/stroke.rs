//! Freehand stroke recording and undo history.

use crate::tools::BrushKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Serializable stroke color (RGB, always fully opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::black()
    }
}

/// One continuous freehand path from gesture start to gesture end.
///
/// Points grow monotonically while the originating gesture is active and the
/// stroke is immutable afterwards. A single-point stroke is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    /// Compositing rule for this stroke.
    pub brush: BrushKind,
    /// Path points in canvas space, chronological.
    pub points: Vec<Point>,
    /// Stroke color (ignored by the eraser).
    pub color: Rgb,
    /// Stroke width in canvas units.
    pub width: f64,
}

impl Stroke {
    /// Create a stroke with its initial point.
    pub fn new(brush: BrushKind, start: Point, color: Rgb, width: f64) -> Self {
        Self {
            brush,
            points: vec![start],
            color,
            width,
        }
    }
}

/// Records strokes for the active brush tool and owns their undo history.
///
/// State machine: `Idle -> Drawing -> Idle`. `begin` opens a stroke with one
/// point, `extend` only ever grows the newest stroke, `finish` stops growth
/// without any further finalization.
#[derive(Debug, Clone, Default)]
pub struct StrokeEngine {
    strokes: Vec<Stroke>,
    drawing: bool,
}

impl StrokeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke at `start`.
    ///
    /// The stroke keeps the brush/color/width it was started with even if the
    /// session settings change mid-gesture.
    pub fn begin(&mut self, brush: BrushKind, start: Point, color: Rgb, width: f64) {
        self.strokes.push(Stroke::new(brush, start, color, width));
        self.drawing = true;
    }

    /// Append a point to the in-progress stroke. No-op while idle.
    pub fn extend(&mut self, point: Point) {
        if !self.drawing {
            return;
        }
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.points.push(point);
        }
    }

    /// End the in-progress stroke. The stroke stays in the list permanently
    /// (until undo or reset).
    pub fn finish(&mut self) {
        self.drawing = false;
    }

    /// Whether a stroke gesture is currently active.
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Remove the single most recent stroke.
    /// Returns false (and changes nothing) when the list is empty.
    pub fn undo(&mut self) -> bool {
        if self.strokes.pop().is_some() {
            self.drawing = false;
            true
        } else {
            false
        }
    }

    /// Clear the entire stroke list. Layers are not touched by this.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.drawing = false;
    }

    /// Strokes in chronological order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
