//! pdfmate - Merge, split and compress PDF documents.
//!
//! This library works on the PDF object graph directly: pages are moved
//! between documents together with everything they reference, and streams
//! are recompressed through their own filter chains. It provides:
//!
//! - Merging several files in order, with optional per-file bookmarks
//! - Splitting a file into fixed-size chunks or extracting one page range
//! - Recompressing a file at one of three levels
//! - Structured outcomes and errors a host shell can serialize
//!
//! # Examples
//!
//! ## Merge
//!
//! ```no_run
//! use pdfmate::config::{OperationOptions, SourcePolicy};
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> pdfmate::Result<()> {
//! let options = OperationOptions {
//!     source_policy: SourcePolicy::Skip,
//!     bookmarks: true,
//!     ..Default::default()
//! };
//! let sources = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let outcome = pdfmate::merge(&sources, Path::new("out"), &options).await?;
//! println!("Wrote {}", outcome.outputs[0].path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Compress
//!
//! ```no_run
//! use pdfmate::CompressionLevel;
//! use pdfmate::config::OperationOptions;
//! use std::path::Path;
//!
//! # async fn example() -> pdfmate::Result<()> {
//! let outcome = pdfmate::compress(
//!     Path::new("scan.pdf"),
//!     CompressionLevel::High,
//!     Path::new("out"),
//!     &OperationOptions::default(),
//! )
//! .await?;
//! if let Some(report) = &outcome.compression {
//!     println!("{} streams recoded", report.recoded_count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use pdfmate::merge::{Assembler, PageExtractor};
//! use pdfmate::model::{PdfDocument, SerializeOptions};
//!
//! # fn example(bytes: &[u8]) -> pdfmate::Result<()> {
//! let source = PdfDocument::parse(bytes)?;
//! let mut assembler = Assembler::new();
//! let page = PageExtractor::new().extract(&source, source.page_count())?;
//! assembler.import_page(&page)?;
//! let last_page = assembler.finish()?.serialize(&SerializeOptions::default())?;
//! # let _ = last_page;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compress;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod model;
pub mod ops;
pub mod output;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{CompressionLevel, Config, OperationOptions, SourcePolicy};
pub use error::{ErrorKind, ErrorReport, PdfMateError, Result};
pub use ops::{OperationOutcome, compress, inspect, merge, split_by_count, split_by_range};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
