//! PDF writing.
//!
//! Outputs are serialized in memory, written to a hidden temporary sibling
//! and renamed into place, so a failed write never leaves a partial file
//! under the final name.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmate::io::writer::PdfWriter;
//! use pdfmate::model::{PdfDocument, SerializeOptions};
//! use std::path::Path;
//!
//! # async fn example(doc: PdfDocument) -> pdfmate::Result<()> {
//! let stats = PdfWriter::new()
//!     .save_with_stats(doc, Path::new("output.pdf"), SerializeOptions::default())
//!     .await?;
//! println!("Wrote {} bytes in {:?}", stats.file_size, stats.write_time);
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfMateError, Result};
use crate::model::{PdfDocument, SerializeOptions, XrefForm};

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time spent serializing and writing.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path the file was published at.
    pub output_path: PathBuf,

    /// Cross-reference form that was written.
    pub xref_form: XrefForm,
}

/// Temporary file that is deleted on drop unless it was published.
struct PendingFile {
    path: PathBuf,
    published: bool,
}

impl PendingFile {
    fn create(path: PathBuf) -> Result<(Self, std::fs::File)> {
        let file = std::fs::File::create(&path).map_err(|e| PdfMateError::FailedToCreateOutput {
            path: path.clone(),
            source: e,
        })?;
        Ok((
            Self {
                path,
                published: false,
            },
            file,
        ))
    }

    fn publish(mut self, target: &Path) -> Result<()> {
        std::fs::rename(&self.path, target).map_err(|e| PdfMateError::FailedToWrite {
            path: target.to_path_buf(),
            source: e,
        })?;
        self.published = true;
        Ok(())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.published && std::fs::remove_file(&self.path).is_ok() {
            tracing::debug!(path = %self.path.display(), "Removed temporary file");
        }
    }
}

/// Hidden sibling used while `path` is being written.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Serializes documents and publishes them atomically.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl PdfWriter {
    /// Create a new PDF writer.
    pub fn new() -> Self {
        Self
    }

    /// Serialize `document` and publish it at `path`.
    ///
    /// Serialization and file I/O run on the blocking pool. On any error
    /// the temporary file is removed and nothing exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The document cannot be serialized
    /// - The temporary file cannot be created or written
    /// - The rename onto `path` fails
    pub async fn save_with_stats(
        &self,
        document: PdfDocument,
        path: &Path,
        options: SerializeOptions,
    ) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();
            let bytes = document.serialize(&options)?;

            let (pending, file) = PendingFile::create(temp_path_for(&path_buf))?;
            let mut writer = std::io::BufWriter::new(file);
            let failed = |e: std::io::Error| PdfMateError::FailedToWrite {
                path: pending.path.clone(),
                source: e,
            };
            writer.write_all(&bytes).map_err(failed)?;
            writer
                .into_inner()
                .map_err(|e| failed(e.into_error()))?
                .sync_all()
                .map_err(failed)?;
            pending.publish(&path_buf)?;

            Ok::<_, PdfMateError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
                xref_form: options.xref,
            })
        })
        .await??;

        tracing::debug!(
            path = %stats.output_path.display(),
            size = stats.file_size,
            elapsed = ?stats.write_time,
            "Wrote PDF"
        );

        Ok(stats)
    }

    /// Check that `dir` exists and can receive outputs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the directory is missing, not a directory
    /// or read-only.
    pub async fn can_write(&self, dir: &Path) -> Result<()> {
        let metadata = tokio::fs::metadata(dir).await.map_err(|_| {
            PdfMateError::invalid_config(format!(
                "Output directory does not exist: {}",
                dir.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(PdfMateError::invalid_config(format!(
                "Output path is not a directory: {}",
                dir.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(PdfMateError::invalid_config(format!(
                "Output directory is not writable: {}",
                dir.display()
            )));
        }

        Ok(())
    }

    /// Remove an output file if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn remove_if_exists(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PdfMateError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Remove every path in `paths` concurrently, logging failures.
    pub async fn remove_all(&self, paths: &[PathBuf]) {
        let removals = paths.iter().map(|path| async move {
            if let Err(e) = self.remove_if_exists(path).await {
                tracing::warn!(path = %path.display(), error = %e, "Could not remove output");
            }
        });
        futures::future::join_all(removals).await;
    }
}
