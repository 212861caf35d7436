//! Split one source into chunks or a single page range.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;

use crate::config::{Metadata, OperationOptions, PageSpan};
use crate::error::{PdfMateError, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::merge::{self, MetadataManager};
use crate::model::{PdfDocument, SerializeOptions};
use crate::ops::naming::base_name;
use crate::ops::{OperationKind, OperationOutcome, OutputFile, OutputNamer, ReservedPath, emit};

/// Split `source` into consecutive chunks of `pages_per_split` pages.
///
/// Chunk `k` is written to `<base>_split_<k>_<millis>.pdf`; the last chunk
/// may be shorter. If any chunk fails, chunks already published are removed
/// before the error is returned.
///
/// # Errors
///
/// Returns an error if:
/// - `pages_per_split` is 0
/// - The source cannot be read
/// - A chunk cannot be built or written
pub async fn split_by_count(
    source: &Path,
    pages_per_split: u32,
    output_dir: &Path,
    options: &OperationOptions,
) -> Result<OperationOutcome> {
    let start = Instant::now();
    if pages_per_split == 0 {
        return Err(PdfMateError::invalid_config(
            "Pages per split must be at least 1",
        ));
    }
    let writer = PdfWriter::new();
    writer.can_write(output_dir).await?;

    let loaded = PdfReader::new().load(source).await?;
    let mut outcome = OperationOutcome::new(OperationKind::SplitByCount, options.share_after_save);
    outcome.input_size = loaded.file_size;

    let total = loaded.page_count;
    let metadata = MetadataManager::new().get_metadata(loaded.document.inner());
    let document = Arc::new(loaded.document);
    let namer = OutputNamer::new(output_dir);
    let base = base_name(source);

    let chunks = chunk_bounds(total, pages_per_split);
    tracing::debug!(pages = total, chunks = chunks.len(), "Splitting by count");

    let mut published: Vec<OutputFile> = Vec::with_capacity(chunks.len());
    for (index, (first, last)) in chunks.into_iter().enumerate() {
        let path = namer.split_chunk(&base, index + 1);
        match write_range(&document, first, last, &metadata, path).await {
            Ok(output) => published.push(output),
            Err(err) => {
                let paths: Vec<PathBuf> =
                    published.into_iter().map(|output| output.path).collect();
                tracing::warn!(
                    chunk = index + 1,
                    removed = paths.len(),
                    error = %err,
                    "Split failed, removing published chunks"
                );
                writer.remove_all(&paths).await;
                return Err(err);
            }
        }
    }

    outcome.outputs = published;
    Ok(outcome.finished(start.elapsed()))
}

/// Write pages `start..=end` of `source` to `<base>_pages_<start>-<end>_<millis>.pdf`.
///
/// `end` is clamped to the page count, and the file name uses the clamped
/// value.
///
/// # Errors
///
/// Returns `InvalidPageRange` if `start` is 0, `end < start`, or `start`
/// lies beyond the last page, and an error if the source cannot be read or
/// the output cannot be written.
pub async fn split_by_range(
    source: &Path,
    start: u32,
    end: u32,
    output_dir: &Path,
    options: &OperationOptions,
) -> Result<OperationOutcome> {
    let started = Instant::now();
    PdfWriter::new().can_write(output_dir).await?;

    let loaded = PdfReader::new().load(source).await?;
    let total = loaded.page_count;
    let span = PageSpan::new(start, end)
        .ok()
        .and_then(|span| span.clamp_to(total))
        .ok_or_else(|| PdfMateError::InvalidPageRange {
            path: source.to_path_buf(),
            range: format!("{start}-{end}"),
            total_pages: total,
        })?;
    if span.end != end {
        tracing::debug!(requested = end, clamped = span.end, "Clamped range end");
    }

    let mut outcome = OperationOutcome::new(OperationKind::SplitByRange, options.share_after_save);
    outcome.input_size = loaded.file_size;

    let metadata = MetadataManager::new().get_metadata(loaded.document.inner());
    let path = OutputNamer::new(output_dir).range(&base_name(source), span.start, span.end);
    let output = write_range(
        &Arc::new(loaded.document),
        span.start,
        span.end,
        &metadata,
        path,
    )
    .await?;

    outcome.outputs.push(output);
    Ok(outcome.finished(started.elapsed()))
}

/// Inclusive `(first, last)` page pairs covering `1..=total` in chunks of `size`.
fn chunk_bounds(total: u32, size: u32) -> Vec<(u32, u32)> {
    (1..=total)
        .step_by(size as usize)
        .map(|first| (first, first.saturating_add(size - 1).min(total)))
        .collect()
}

/// Build a document from one page range of `source` and publish it.
async fn write_range(
    source: &Arc<PdfDocument>,
    first: u32,
    last: u32,
    metadata: &Metadata,
    path: ReservedPath,
) -> Result<OutputFile> {
    let source = Arc::clone(source);
    let metadata = metadata.clone();

    let document = task::spawn_blocking(move || {
        let mut document = merge::extract_pages(&source, first, last)?.finish()?;
        MetadataManager::new().apply(document.inner_mut(), &metadata)?;
        Ok::<_, PdfMateError>(document)
    })
    .await??;

    emit(document, path, SerializeOptions::default()).await
}
