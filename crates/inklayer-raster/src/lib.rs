//! InkLayer Raster
//!
//! CPU rendering for the InkLayer session: composites layers and strokes
//! into RGBA pixmaps, encodes PNG snapshots as data URLs, decodes incoming
//! images, and drives the mount/render/capture frame loop.

pub mod compose;
pub mod decode;
pub mod pixmap;
pub mod snapshot;
pub mod stage;

pub use compose::{compose, compose_frame};
pub use decode::{decode_image, DecodeError};
pub use pixmap::Pixmap;
pub use snapshot::{snapshot, to_data_url, SnapshotError};
pub use stage::{Frame, Stage};
