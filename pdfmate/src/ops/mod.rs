//! The four document operations.
//!
//! Every operation opens its source(s), transforms them on the blocking pool
//! and publishes its output(s) atomically into `output_dir`. A failed
//! operation returns an error and leaves no output behind; a successful one
//! returns an [`OperationOutcome`] the caller can serialize for its shell.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmate::config::OperationOptions;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> pdfmate::Result<()> {
//! let sources = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let options = OperationOptions::default();
//! let outcome = pdfmate::ops::merge(&sources, Path::new("out"), &options).await?;
//! println!("{}", outcome.outputs[0].path.display());
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod info;
pub mod merging;
pub mod naming;
pub mod splitting;

pub use compression::compress;
pub use info::{DocumentInfo, inspect};
pub use merging::merge;
pub use naming::{OutputNamer, ReservedPath};
pub use splitting::{split_by_count, split_by_range};

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compress::CompressionReport;
use crate::error::{ErrorReport, Result};
use crate::io::PdfWriter;
use crate::model::{PdfDocument, SerializeOptions};

/// Which operation produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Several sources into one output.
    Merge,
    /// Fixed-size chunks of one source.
    SplitByCount,
    /// One inclusive page range of one source.
    SplitByRange,
    /// One source recompressed.
    Compress,
}

/// One published file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    /// Where it was written.
    pub path: PathBuf,
    /// Pages it contains.
    pub pages: u32,
    /// Size in bytes.
    pub size: u64,
}

/// A merge source that was skipped under `SourcePolicy::Skip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    /// The source path.
    pub path: PathBuf,
    /// Why it was skipped.
    pub error: ErrorReport,
}

/// Result of a successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    /// The operation that ran.
    pub operation: OperationKind,
    /// Published files, in page order.
    pub outputs: Vec<OutputFile>,
    /// Copied from the options for the shell's hand-off.
    pub share_after_save: bool,
    /// Sources a merge skipped.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedSource>,
    /// Per-stream results of a compress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<CompressionReport>,
    /// Total size of the sources that were read.
    pub input_size: u64,
    /// Wall-clock duration of the operation.
    pub elapsed_ms: u64,
}

impl OperationOutcome {
    fn new(operation: OperationKind, share_after_save: bool) -> Self {
        Self {
            operation,
            outputs: Vec::new(),
            share_after_save,
            skipped: Vec::new(),
            compression: None,
            input_size: 0,
            elapsed_ms: 0,
        }
    }

    fn finished(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Paths of the published files.
    pub fn paths(&self) -> Vec<&Path> {
        self.outputs.iter().map(|output| output.path.as_path()).collect()
    }

    /// Pages written across all outputs.
    pub fn total_pages(&self) -> u32 {
        self.outputs.iter().map(|output| output.pages).sum()
    }

    /// Bytes written across all outputs.
    pub fn output_size(&self) -> u64 {
        self.outputs.iter().map(|output| output.size).sum()
    }
}

/// Publish `document` at `path`; the reservation ends once the write is done.
async fn emit(
    document: PdfDocument,
    path: ReservedPath,
    options: SerializeOptions,
) -> Result<OutputFile> {
    let pages = document.page_count();
    let stats = PdfWriter::new()
        .save_with_stats(document, path.path(), options)
        .await?;
    drop(path);

    tracing::info!(
        path = %stats.output_path.display(),
        pages,
        size = stats.file_size,
        "Published output"
    );

    Ok(OutputFile {
        path: stats.output_path,
        pages,
        size: stats.file_size,
    })
}
