//! PDF loading.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmate::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # async fn example() -> pdfmate::Result<()> {
//! let loaded = PdfReader::new().load(Path::new("document.pdf")).await?;
//! println!("Loaded {} pages in {:?}", loaded.page_count, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfMateError, Result};
use crate::model::{PdfDocument, XrefForm, xref_form_of};

/// A parsed source with load statistics.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The parsed document.
    pub document: PdfDocument,

    /// Path it was read from.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: u32,

    /// Time spent reading and parsing.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,

    /// Cross-reference form of the file's last section, if it could be found.
    pub xref_form: Option<XrefForm>,
}

/// Reads and parses PDF files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Read `path` into memory and parse it on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is not a regular file
    /// - The file cannot be read
    /// - The bytes are not a readable, unencrypted PDF
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();
        let start = Instant::now();

        let metadata = tokio::fs::metadata(&path_buf)
            .await
            .map_err(|e| access_error(&path_buf, e))?;
        if !metadata.is_file() {
            return Err(PdfMateError::NotAFile { path: path_buf });
        }

        let bytes = tokio::fs::read(&path_buf)
            .await
            .map_err(|e| access_error(&path_buf, e))?;
        let file_size = bytes.len() as u64;
        let xref_form = xref_form_of(&bytes);

        let document = task::spawn_blocking(move || PdfDocument::parse(&bytes))
            .await?
            .map_err(|e| e.at_path(path_buf.clone()))?;

        let load_time = start.elapsed();
        tracing::debug!(
            path = %path_buf.display(),
            pages = document.page_count(),
            objects = document.object_count(),
            elapsed = ?load_time,
            "Loaded PDF"
        );

        Ok(LoadedPdf {
            page_count: document.page_count(),
            document,
            path: path_buf,
            load_time,
            file_size,
            xref_form,
        })
    }
}

fn access_error(path: &Path, err: io::Error) -> PdfMateError {
    match err.kind() {
        io::ErrorKind::NotFound => PdfMateError::file_not_found(path.to_path_buf()),
        _ => PdfMateError::FileNotAccessible {
            path: path.to_path_buf(),
            source: err,
        },
    }
}
