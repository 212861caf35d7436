//! Page-level document building.
//!
//! This module provides the pieces every page-moving operation is built from:
//! - Page extraction with resource closure ([`PageExtractor`])
//! - Renumbering import into a fresh document ([`Assembler`])
//! - Outline entries for merged sources ([`BookmarkManager`])
//! - Info dictionary handling ([`MetadataManager`])
//!
//! # Examples
//!
//! ```no_run
//! use pdfmate::merge::{Assembler, PageExtractor};
//! use pdfmate::model::PdfDocument;
//!
//! # fn example(a: PdfDocument, b: PdfDocument) -> pdfmate::Result<()> {
//! let extractor = PageExtractor::new();
//! let mut assembler = Assembler::new();
//! for source in [&a, &b] {
//!     for n in 1..=source.page_count() {
//!         assembler.import_page(&extractor.extract(source, n)?)?;
//!     }
//! }
//! let merged = assembler.finish()?;
//! println!("Merged {} pages", merged.page_count());
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod bookmarks;
pub mod metadata;
pub mod pages;

pub use assembler::Assembler;
pub use bookmarks::BookmarkManager;
pub use metadata::MetadataManager;
pub use pages::{ImportablePage, PageExtractor};

use crate::error::Result;
use crate::model::PdfDocument;

/// Build a document holding pages `first..=last` of `source`.
///
/// # Errors
///
/// Returns an error if a page is out of range or cannot be extracted.
pub fn extract_pages(source: &PdfDocument, first: u32, last: u32) -> Result<Assembler> {
    let extractor = PageExtractor::new();
    let mut assembler = Assembler::new();
    for n in first..=last {
        assembler.import_page(&extractor.extract(source, n)?)?;
    }
    Ok(assembler)
}
