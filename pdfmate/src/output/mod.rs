//! User-facing output for the command-line tool.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmate::output::OutputFormatter;
//! use pdfmate::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Merging 3 files");
//! formatter.success("Merge completed");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::ops::{DocumentInfo, OperationKind, OperationOutcome};
use crate::utils::{format_file_size, format_size_change};

/// Headline for a finished operation.
pub fn outcome_summary(outcome: &OperationOutcome) -> String {
    let files = outcome.outputs.len();
    match outcome.operation {
        OperationKind::Merge => format!("Merged {} page(s) into 1 file", outcome.total_pages()),
        OperationKind::SplitByCount => format!(
            "Split {} page(s) into {files} file(s)",
            outcome.total_pages()
        ),
        OperationKind::SplitByRange => format!("Extracted {} page(s)", outcome.total_pages()),
        OperationKind::Compress => format!(
            "Compressed {} -> {} ({})",
            format_file_size(outcome.input_size),
            format_file_size(outcome.output_size()),
            format_size_change(outcome.input_size, outcome.output_size())
        ),
    }
}

/// Display the result of an operation.
pub fn display_outcome(formatter: &OutputFormatter, outcome: &OperationOutcome) {
    for skipped in &outcome.skipped {
        formatter.warning(&format!(
            "Skipped {}: {}",
            skipped.path.display(),
            skipped.error.message
        ));
    }

    if let Some(report) = &outcome.compression {
        for failure in report.failures() {
            formatter.warning(&format!(
                "Stream {} {} R could not be decoded and was copied unchanged",
                failure.id.0, failure.id.1
            ));
        }
    }

    formatter.success(&outcome_summary(outcome));

    for (index, output) in outcome.outputs.iter().enumerate() {
        formatter.list_item(
            index + 1,
            &format!(
                "{} ({} page(s), {})",
                output.path.display(),
                output.pages,
                format_file_size(output.size)
            ),
        );
    }

    if let Some(report) = &outcome.compression {
        formatter.debug(&format!(
            "{} stream(s) recoded, {} passed through, {} unused object(s) pruned, {} saved",
            report.recoded_count(),
            report.passthrough_count(),
            report.pruned_objects,
            format_file_size(report.bytes_saved())
        ));
    }
    formatter.debug(&format!("Finished in {} ms", outcome.elapsed_ms));
}

/// Display the summary of an inspected document.
pub fn display_document_info(formatter: &OutputFormatter, info: &DocumentInfo) {
    formatter.info(&info.path.display().to_string());
    formatter.detail("Version", &info.version);
    formatter.detail("Pages", &info.page_count.to_string());
    formatter.detail("Objects", &info.object_count.to_string());
    formatter.detail("Size", &format_file_size(info.file_size));
    if let Some(page) = info.first_page {
        formatter.detail(
            "Page size",
            &format!("{:.1} x {:.1} pt", page.width(), page.height()),
        );
    }
    formatter.detail(
        "Xref stream",
        if info.has_xref_stream() { "yes" } else { "no" },
    );

    let metadata = &info.metadata;
    for (label, value) in [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
    ] {
        if let Some(value) = value {
            formatter.detail(label, value);
        }
    }
}
