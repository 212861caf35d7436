//! In-memory PDF object model.
//!
//! [`PdfDocument`] wraps a `lopdf::Document` that has been checked for the
//! structural guarantees the rest of the crate relies on: a catalog with a
//! page tree, no encryption, and no reference reachable from the catalog
//! that points at a missing object. Stream payloads stay encoded until a
//! caller asks for them through [`filters`].

pub mod document;
pub mod filters;
pub mod graph;

pub use document::{MediaBox, PdfDocument};
pub use filters::{Filter, FilterStep};
pub use graph::Reachability;

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cross-reference section layout written by the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum XrefForm {
    /// Classic `xref` table followed by a `trailer` dictionary.
    Table,
    /// Cross-reference stream, with non-stream objects packed into object
    /// streams.
    Stream,
}

/// Options for [`PdfDocument::serialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Cross-reference layout.
    pub xref: XrefForm,
    /// Deflate level for object and cross-reference streams (0-9).
    pub compression_level: u32,
}

impl SerializeOptions {
    /// Options matching a compression level.
    pub fn for_level(level: crate::CompressionLevel) -> Self {
        Self {
            xref: level.xref_form(),
            compression_level: level.flate_level(),
        }
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            xref: XrefForm::Table,
            compression_level: 6,
        }
    }
}

/// Identity of one parsed source, used to key resource deduplication.
///
/// Every call to [`PdfDocument::parse`] gets a fresh id, so two parses of the
/// same bytes never share imported objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Detect which cross-reference form a serialized file ends with.
///
/// Follows the last `startxref` offset and checks whether a classic `xref`
/// keyword sits there. Returns `None` if the tail cannot be read.
pub fn xref_form_of(bytes: &[u8]) -> Option<XrefForm> {
    const KEYWORD: &[u8] = b"startxref";

    let tail = &bytes[bytes.len().saturating_sub(2048)..];
    let pos = tail.windows(KEYWORD.len()).rposition(|w| w == KEYWORD)?;
    let digits: String = tail[pos + KEYWORD.len()..]
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();
    let offset: usize = digits.parse().ok()?;

    let section = bytes.get(offset..)?;
    let start = section.iter().position(|b| !b.is_ascii_whitespace())?;
    if section[start..].starts_with(b"xref") {
        Some(XrefForm::Table)
    } else {
        Some(XrefForm::Stream)
    }
}
