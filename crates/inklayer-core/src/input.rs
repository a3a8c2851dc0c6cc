//! Input dispatch: raw pointer/touch events to a single gesture stream.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A raw device event, before normalization.
///
/// Positions are in device coordinates and optional: the host reports `None`
/// when no coordinate can be resolved (pointer outside the canvas at event
/// time). Touch events carry only the primary contact point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PointerInput {
    MouseDown { position: Option<Point> },
    MouseMove { position: Option<Point> },
    MouseUp,
    TouchStart { position: Option<Point> },
    TouchMove { position: Option<Point> },
    TouchEnd,
}

impl PointerInput {
    fn is_touch(&self) -> bool {
        matches!(
            self,
            PointerInput::TouchStart { .. } | PointerInput::TouchMove { .. } | PointerInput::TouchEnd
        )
    }
}

/// A normalized gesture event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gesture {
    Start(Point),
    Move(Point),
    End,
}

/// Result of dispatching one raw event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatch {
    /// The gesture event to feed downstream, if the raw event produced one.
    pub gesture: Option<Gesture>,
    /// Whether the host should suppress default browser/system behavior
    /// (scroll, text selection) for this event. Set for touch move/end while
    /// a gesture is active.
    pub suppress_default: bool,
}

impl Dispatch {
    fn none() -> Self {
        Self::default()
    }
}

/// Normalizes mouse and touch events into one `start`/`move`/`end` stream.
///
/// Tracks a single contact: a second concurrent start is dropped, so at most
/// one gesture is ever active. Events without a resolvable coordinate are
/// dropped, never an error.
#[derive(Debug, Clone, Default)]
pub struct InputDispatcher {
    /// Canvas origin in device coordinates (scroll/layout offset).
    origin: Vec2,
    /// Whether a gesture is currently active.
    active: bool,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas origin used to map device to canvas coordinates.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn to_canvas(&self, device: Point) -> Point {
        Point::new(device.x - self.origin.x, device.y - self.origin.y)
    }

    /// Process a raw event, yielding at most one gesture event.
    pub fn handle(&mut self, event: PointerInput) -> Dispatch {
        let touch = event.is_touch();
        match event {
            PointerInput::MouseDown { position } | PointerInput::TouchStart { position } => {
                if self.active {
                    // Secondary contact; multi-touch is not supported.
                    log::debug!("dropping secondary contact start");
                    return Dispatch::none();
                }
                let Some(position) = position else {
                    return Dispatch::none();
                };
                self.active = true;
                Dispatch {
                    gesture: Some(Gesture::Start(self.to_canvas(position))),
                    suppress_default: false,
                }
            }
            PointerInput::MouseMove { position } | PointerInput::TouchMove { position } => {
                if !self.active {
                    return Dispatch::none();
                }
                let Some(position) = position else {
                    // Unresolvable coordinate: drop the event, keep the gesture.
                    return Dispatch {
                        gesture: None,
                        suppress_default: touch,
                    };
                };
                Dispatch {
                    gesture: Some(Gesture::Move(self.to_canvas(position))),
                    suppress_default: touch,
                }
            }
            PointerInput::MouseUp | PointerInput::TouchEnd => {
                if !self.active {
                    return Dispatch::none();
                }
                self.active = false;
                Dispatch {
                    gesture: Some(Gesture::End),
                    suppress_default: touch,
                }
            }
        }
    }
}
