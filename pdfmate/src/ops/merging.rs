//! Merge several sources into one document.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;

use crate::config::{OperationOptions, SourcePolicy};
use crate::error::{PdfMateError, Result};
use crate::io::{LoadedPdf, PdfReader, PdfWriter};
use crate::merge::{Assembler, BookmarkManager, ImportablePage, MetadataManager, PageExtractor};
use crate::model::{PdfDocument, SerializeOptions};
use crate::ops::{OperationKind, OperationOutcome, OutputNamer, SkippedSource, emit};

/// Merge `sources` in order into `output_dir/merged_pdf_<millis>.pdf`.
///
/// Each source contributes all of its pages in their original order. Under
/// `SourcePolicy::Abort` the first source that cannot be read fails the
/// merge; under `SourcePolicy::Skip` it is logged and listed in
/// [`OperationOutcome::skipped`].
///
/// # Errors
///
/// Returns an error if:
/// - `sources` is empty, or every source was skipped
/// - `output_dir` is not a writable directory
/// - A source fails under `SourcePolicy::Abort`
/// - The merged document cannot be written
pub async fn merge(
    sources: &[PathBuf],
    output_dir: &Path,
    options: &OperationOptions,
) -> Result<OperationOutcome> {
    let start = Instant::now();
    if sources.is_empty() {
        return Err(PdfMateError::NoFilesToMerge);
    }
    PdfWriter::new().can_write(output_dir).await?;

    let mut outcome = OperationOutcome::new(OperationKind::Merge, options.share_after_save);
    let reader = PdfReader::new();
    let mut loaded = Vec::with_capacity(sources.len());

    for path in sources {
        match reader.load(path).await {
            Ok(pdf) => {
                outcome.input_size += pdf.file_size;
                loaded.push(pdf);
            }
            Err(err) => outcome.skipped.push(skip_or_abort(path, err, options)?),
        }
    }

    let options_for_task = options.clone();
    let (document, skipped) =
        task::spawn_blocking(move || assemble(&loaded, &options_for_task)).await??;
    outcome.skipped.extend(skipped);

    let path = OutputNamer::new(output_dir).merged();
    outcome.outputs.push(emit(document, path, SerializeOptions::default()).await?);

    Ok(outcome.finished(start.elapsed()))
}

/// Skip a failed source if the policy allows it, otherwise return the error.
fn skip_or_abort(
    path: &Path,
    err: PdfMateError,
    options: &OperationOptions,
) -> Result<SkippedSource> {
    if options.source_policy == SourcePolicy::Skip && err.is_recoverable() {
        tracing::warn!(path = %path.display(), error = %err, "Skipping source");
        Ok(SkippedSource {
            path: path.to_path_buf(),
            error: (&err).into(),
        })
    } else {
        Err(err)
    }
}

/// Import every page of every source, in order.
fn assemble(
    sources: &[LoadedPdf],
    options: &OperationOptions,
) -> Result<(PdfDocument, Vec<SkippedSource>)> {
    let extractor = PageExtractor::new();
    let mut assembler = Assembler::new();
    let mut skipped = Vec::new();
    let mut outline = Vec::new();
    let mut metadata = None;

    for source in sources {
        // A skipped source contributes no pages.
        let pages: Result<Vec<ImportablePage<'_>>> = (1..=source.page_count)
            .map(|n| extractor.extract(&source.document, n))
            .collect();
        let pages = match pages {
            Ok(pages) => pages,
            Err(err) => {
                let err = err.at_path(source.path.clone());
                skipped.push(skip_or_abort(&source.path, err, options)?);
                continue;
            }
        };

        let mut first_page = None;
        for page in &pages {
            let id = assembler.import_page(page)?;
            first_page.get_or_insert(id);
        }
        if let Some(first_page) = first_page {
            outline.push((BookmarkManager::title_for(&source.path), first_page));
        }
        metadata
            .get_or_insert_with(|| MetadataManager::new().get_metadata(source.document.inner()));

        tracing::debug!(path = %source.path.display(), pages = pages.len(), "Merged source");
    }

    let Some(metadata) = metadata else {
        return Err(PdfMateError::NoFilesToMerge);
    };

    if options.bookmarks
        && let Some(outlines) =
            BookmarkManager::new().create_outline(assembler.document_mut(), &outline)
    {
        assembler.set_outlines(outlines);
    }

    let mut document = assembler.finish()?;
    MetadataManager::new().apply(document.inner_mut(), &metadata)?;
    Ok((document, skipped))
}
