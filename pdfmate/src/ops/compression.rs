//! Recompress one source.

use std::path::Path;
use std::time::Instant;
use tokio::task;

use crate::compress::Compressor;
use crate::config::{CompressionLevel, OperationOptions};
use crate::error::{PdfMateError, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::merge::MetadataManager;
use crate::model::SerializeOptions;
use crate::ops::naming::base_name;
use crate::ops::{OperationKind, OperationOutcome, OutputNamer, emit};

/// Recompress `source` at `level` into `<base>_compressed_<millis>.pdf`.
///
/// Streams that cannot be recoded are kept as they are and listed in the
/// outcome's compression report; they never fail the operation. The
/// source's Info dictionary is kept with `Producer` and `ModDate` updated.
///
/// # Errors
///
/// Returns an error if the source cannot be read or the output cannot be
/// written.
pub async fn compress(
    source: &Path,
    level: CompressionLevel,
    output_dir: &Path,
    options: &OperationOptions,
) -> Result<OperationOutcome> {
    let start = Instant::now();
    PdfWriter::new().can_write(output_dir).await?;

    let loaded = PdfReader::new().load(source).await?;
    let mut outcome = OperationOutcome::new(OperationKind::Compress, options.share_after_save);
    outcome.input_size = loaded.file_size;

    let (document, report) = task::spawn_blocking(move || {
        let (mut document, report) = Compressor::new(level).compress(loaded.document)?;
        MetadataManager::new().stamp(document.inner_mut())?;
        Ok::<_, PdfMateError>((document, report))
    })
    .await??;

    let path = OutputNamer::new(output_dir).compressed(&base_name(source));
    let output = emit(document, path, SerializeOptions::for_level(level)).await?;

    tracing::info!(
        level = level.as_str(),
        before = outcome.input_size,
        after = output.size,
        recoded = report.recoded_count(),
        passed_through = report.passthrough_count(),
        "Compressed"
    );

    outcome.outputs.push(output);
    outcome.compression = Some(report);
    Ok(outcome.finished(start.elapsed()))
}
