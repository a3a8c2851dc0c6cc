//! Deferred captures: exports that wait for the next rendered frame.
//!
//! Exports must not include the selection overlay, so the session clears the
//! selection first and the capture itself waits until a frame without the
//! overlay has actually been rendered. Requests queue in order and are never
//! coalesced: two requests before the same frame both fire.

use serde::{Deserialize, Serialize};

/// What a deferred capture is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureKind {
    /// Full-canvas snapshot handed back to the host as a download.
    Download,
    /// Full-canvas snapshot appended to the mask list.
    Mask,
}

#[derive(Debug, Clone, Copy)]
struct PendingCapture {
    kind: CaptureKind,
    /// Frame counter value at request time; due once a later frame renders.
    requested_at: u64,
}

/// Queue of captures waiting for a frame boundary.
#[derive(Debug, Clone, Default)]
pub struct CaptureQueue {
    pending: Vec<PendingCapture>,
    frame: u64,
}

impl CaptureQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a capture. It fires after the next `frame_rendered`.
    pub fn request(&mut self, kind: CaptureKind) {
        self.pending.push(PendingCapture {
            kind,
            requested_at: self.frame,
        });
    }

    /// Mark a frame as rendered and drain the captures it satisfies,
    /// in request order.
    pub fn frame_rendered(&mut self) -> Vec<CaptureKind> {
        self.frame += 1;
        let frame = self.frame;
        let mut due = Vec::new();
        self.pending.retain(|capture| {
            if capture.requested_at < frame {
                due.push(capture.kind);
                false
            } else {
                true
            }
        });
        due
    }

    /// Whether any capture is waiting on a frame.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
