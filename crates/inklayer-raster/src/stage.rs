//! Stage lifecycle: mount, input routing, the render/capture loop.
//!
//! The stage owns at most one mounted surface. Hosts feed it raw pointer
//! events and commands, pull a composed frame per tick, and receive deferred
//! exports exactly one frame after they were requested, once the selection
//! overlay is guaranteed to be off screen.

use crate::compose::compose_frame;
use crate::decode::decode_image;
use crate::pixmap::Pixmap;
use crate::snapshot::snapshot;
use inklayer_core::{CaptureKind, Command, Dispatch, InputDispatcher, PointerInput, Surface};
use kurbo::Vec2;

/// One rendered tick: the display pixmap plus any exports that came due.
#[derive(Debug)]
pub struct Frame {
    /// Display frame, selection overlay included.
    pub pixmap: Pixmap,
    /// PNG data URLs for the host to save, in request order.
    pub downloads: Vec<String>,
}

/// Host-facing entry point for one drawing stage.
#[derive(Debug, Default)]
pub struct Stage {
    surface: Option<Surface>,
    dispatcher: InputDispatcher,
    /// Mask snapshots accumulated across the stage's lifetime, oldest first.
    masks: Vec<String>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a fresh surface. Replaces any previous one; strokes and layers
    /// do not survive a remount, accumulated masks do.
    pub fn mount(&mut self, width: u32, height: u32) {
        log::info!("stage mounted at {width}x{height}");
        self.surface = Some(Surface::new(width, height));
        self.dispatcher = InputDispatcher::new();
    }

    pub fn unmount(&mut self) {
        if self.surface.take().is_some() {
            log::info!("stage unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut Surface> {
        self.surface.as_mut()
    }

    /// Accumulated mask data URLs, oldest first.
    pub fn masks(&self) -> &[String] {
        &self.masks
    }

    /// Canvas origin in device coordinates, for pointer mapping.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.dispatcher.set_origin(origin);
    }

    /// Route a raw pointer event. Silent no-op while unmounted.
    pub fn pointer(&mut self, event: PointerInput) -> Dispatch {
        let Some(surface) = self.surface.as_mut() else {
            return Dispatch::default();
        };
        let dispatch = self.dispatcher.handle(event);
        if let Some(gesture) = dispatch.gesture {
            surface.handle_gesture(gesture);
        }
        dispatch
    }

    /// Apply a host command. Silent no-op while unmounted.
    pub fn command(&mut self, command: Command) {
        if let Some(surface) = self.surface.as_mut() {
            surface.apply(command);
        }
    }

    /// Reconcile the host's image URL list; returns URLs the host must load.
    pub fn set_imported_urls(&mut self, urls: &[String]) -> Vec<String> {
        match self.surface.as_mut() {
            Some(surface) => surface.sync_imports(urls),
            None => Vec::new(),
        }
    }

    /// Hand over an already-decoded image for a URL load.
    pub fn provide_image(&mut self, url: &str, image: inklayer_core::ImageData) {
        if let Some(surface) = self.surface.as_mut() {
            surface.complete_import(url, image);
        }
    }

    /// Hand over the bytes of a finished URL load. Decode failures are
    /// recorded against the URL and never tear the stage down.
    pub fn provide_image_bytes(&mut self, url: &str, bytes: &[u8]) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match decode_image(bytes) {
            Ok(image) => {
                surface.complete_import(url, image);
            }
            Err(err) => {
                log::warn!("image load failed for {url}: {err}");
                surface.fail_import(url);
            }
        }
    }

    /// Render one frame and settle any captures that were waiting on it.
    ///
    /// The displayed pixmap includes the selection overlay; capture snapshots
    /// never do, because capture requests cleared the selection and waited
    /// for this frame boundary.
    pub fn render(&mut self) -> Option<Frame> {
        let Self { surface, masks, .. } = self;
        let surface = surface.as_mut()?;
        let pixmap = compose_frame(surface);

        let mut downloads = Vec::new();
        for kind in surface.captures.frame_rendered() {
            let url = match snapshot(surface) {
                Ok(url) => url,
                Err(err) => {
                    log::warn!("capture failed: {err}");
                    continue;
                }
            };
            match kind {
                CaptureKind::Download => downloads.push(url),
                CaptureKind::Mask => masks.push(url),
            }
        }

        Some(Frame { pixmap, downloads })
    }
}
