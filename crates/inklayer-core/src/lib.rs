//! InkLayer Core Library
//!
//! Platform-agnostic session state and logic for the InkLayer compositing
//! canvas: gesture dispatch, freehand strokes, transformable image layers,
//! canvas fitting, and deferred snapshot scheduling.

pub mod capture;
pub mod fit;
pub mod geometry;
pub mod import;
pub mod input;
pub mod layer;
pub mod stroke;
pub mod surface;
pub mod tools;

pub use capture::{CaptureKind, CaptureQueue};
pub use fit::FitResult;
pub use geometry::Anchor;
pub use import::ImageImporter;
pub use input::{Dispatch, Gesture, InputDispatcher, PointerInput};
pub use layer::{ImageData, Layer, LayerId, LayerManager};
pub use stroke::{Rgb, Stroke, StrokeEngine};
pub use surface::{Command, Surface, parse_dimension};
pub use tools::{BrushKind, Tool};
