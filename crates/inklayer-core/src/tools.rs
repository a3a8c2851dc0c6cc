//! Tool selection for the canvas.

use serde::{Deserialize, Serialize};

/// Brush variants that produce strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrushKind {
    /// Normal compositing: paints over everything below.
    Pen,
    /// Subtractive compositing: clears everything composed so far.
    Eraser,
}

/// Available tools. Exactly one is active at a time; the active tool decides
/// whether the gesture stream feeds the stroke engine or the layer manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
    Drag,
}

impl Tool {
    /// The brush this tool draws with, or `None` for the drag tool.
    pub fn brush(self) -> Option<BrushKind> {
        match self {
            Tool::Pen => Some(BrushKind::Pen),
            Tool::Eraser => Some(BrushKind::Eraser),
            Tool::Drag => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_routing() {
        assert_eq!(Tool::Pen.brush(), Some(BrushKind::Pen));
        assert_eq!(Tool::Eraser.brush(), Some(BrushKind::Eraser));
        assert_eq!(Tool::Drag.brush(), None);
    }
}
