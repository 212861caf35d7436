//! Filesystem boundary.
//!
//! Sources are read fully into memory before parsing and outputs are
//! published atomically, so nothing in [`crate::model`] touches the disk.

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteStatistics};
