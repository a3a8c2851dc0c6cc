//! The drawing session: one canvas surface and everything on it.

use crate::capture::{CaptureKind, CaptureQueue};
use crate::fit::{fit_canvas, FitResult};
use crate::import::ImageImporter;
use crate::input::Gesture;
use crate::layer::{ImageData, LayerId, LayerManager};
use crate::stroke::{Rgb, StrokeEngine};
use crate::tools::Tool;

/// Stroke width bounds exposed to the host UI, in canvas units.
pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 10;
pub const DEFAULT_STROKE_WIDTH: u32 = 5;

/// A host-issued command against the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetTool(Tool),
    SetColor(Rgb),
    /// Stroke width, clamped to `MIN_STROKE_WIDTH..=MAX_STROKE_WIDTH`.
    SetStrokeWidth(u32),
    /// Remove the most recent stroke.
    Undo,
    /// Clear all strokes. Layers are untouched.
    ResetStrokes,
    /// Queue a full-canvas snapshot for the host to save.
    Download,
    /// Queue a full-canvas snapshot for the mask list.
    GenerateMask,
    /// Fit the canvas to the dominant layer.
    FitCanvas,
    SetCanvasWidth(u32),
    SetCanvasHeight(u32),
}

/// Parse a user-entered canvas dimension. Invalid or empty input degrades to
/// zero rather than erroring, matching form-submission semantics.
pub fn parse_dimension(input: &str) -> u32 {
    input.trim().parse().unwrap_or(0)
}

/// One open drawing session: canvas dimensions, active tool settings, and
/// the stroke/layer/capture/import state.
///
/// Gestures are routed exclusively: brush tools feed the stroke engine, the
/// drag tool feeds the layer manager. Switching tools can therefore never
/// leave a half-owned gesture behind.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    tool: Tool,
    color: Rgb,
    stroke_width: u32,
    pub strokes: StrokeEngine,
    pub layers: LayerManager,
    pub captures: CaptureQueue,
    importer: ImageImporter,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tool: Tool::default(),
            color: Rgb::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            strokes: StrokeEngine::new(),
            layers: LayerManager::new(),
            captures: CaptureQueue::new(),
            importer: ImageImporter::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn stroke_width(&self) -> u32 {
        self.stroke_width
    }

    /// Route a gesture event to the component the active tool owns.
    pub fn handle_gesture(&mut self, gesture: Gesture) {
        match self.tool.brush() {
            Some(brush) => match gesture {
                Gesture::Start(point) => {
                    self.strokes
                        .begin(brush, point, self.color, self.stroke_width as f64)
                }
                Gesture::Move(point) => self.strokes.extend(point),
                Gesture::End => self.strokes.finish(),
            },
            None => self.layers.handle_gesture(gesture),
        }
    }

    /// Apply a host command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetTool(tool) => self.tool = tool,
            Command::SetColor(color) => self.color = color,
            Command::SetStrokeWidth(width) => {
                self.stroke_width = width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
            }
            Command::Undo => {
                self.strokes.undo();
            }
            Command::ResetStrokes => self.strokes.clear(),
            Command::Download => self.queue_capture(CaptureKind::Download),
            Command::GenerateMask => self.queue_capture(CaptureKind::Mask),
            Command::FitCanvas => {
                self.fit_canvas();
            }
            Command::SetCanvasWidth(width) => self.width = width,
            Command::SetCanvasHeight(height) => self.height = height,
        }
    }

    /// Exports must not show the selection overlay, so the selection is
    /// cleared before the capture waits for its overlay-free frame.
    fn queue_capture(&mut self, kind: CaptureKind) {
        self.layers.deselect_all();
        self.captures.request(kind);
    }

    /// Fit the canvas around the dominant layer.
    pub fn fit_canvas(&mut self) -> Option<FitResult> {
        let fit = fit_canvas(&mut self.layers)?;
        self.width = fit.width;
        self.height = fit.height;
        Some(fit)
    }

    /// Reconcile the host's image URL list; returns URLs to start loading.
    pub fn sync_imports(&mut self, urls: &[String]) -> Vec<String> {
        self.importer.sync(urls, &mut self.layers)
    }

    /// Adopt a finished image load as a layer.
    pub fn complete_import(&mut self, url: &str, image: ImageData) -> Option<LayerId> {
        self.importer.complete(url, image, &mut self.layers)
    }

    /// Record a failed image load.
    pub fn fail_import(&mut self, url: &str) {
        self.importer.fail(url);
    }
}
