//! Configuration for pdfmate operations.
//!
//! This module holds the validated settings that drive the four document
//! operations. It handles:
//! - Compression levels and what each one asks of the writer
//! - The per-source failure policy of a merge
//! - Page span parsing for range extraction
//! - Output directory and verbosity for the command-line shell

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

use crate::PdfMateError;
use crate::model::XrefForm;

/// Compression strength for the compress operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Fastest, weakest stream compression; classic xref table.
    Low,
    /// Balanced compression with compact cross-reference streams.
    #[default]
    Normal,
    /// Strongest, slowest compression with compact cross-reference streams.
    High,
}

impl CompressionLevel {
    /// Deflate level used when re-encoding streams.
    pub fn flate_level(self) -> u32 {
        match self {
            Self::Low => 3,
            Self::Normal => 6,
            Self::High => 9,
        }
    }

    /// Cross-reference form requested from the serializer.
    pub fn xref_form(self) -> XrefForm {
        match self {
            Self::Low => XrefForm::Table,
            Self::Normal | Self::High => XrefForm::Stream,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl FromStr for CompressionLevel {
    type Err = PdfMateError;

    /// Parse compression level from string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not one of `low`, `normal`, `high`.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            _ => Err(PdfMateError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: low, normal, high"
            ))),
        }
    }
}

/// What a merge does when one of its sources cannot be opened or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePolicy {
    /// The first failing source aborts the whole merge; nothing is written.
    #[default]
    Abort,
    /// Failing sources are skipped and reported in the outcome.
    Skip,
}

/// Inclusive 1-based page span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    /// First page (1-based).
    pub start: u32,
    /// Last page (1-based, inclusive).
    pub end: u32,
}

impl PageSpan {
    /// Create a span, validating `1 <= start <= end`.
    pub fn new(start: u32, end: u32) -> anyhow::Result<Self> {
        if start == 0 || end == 0 {
            bail!("Page numbers must be positive (1-indexed)");
        }
        if start > end {
            bail!("Invalid range {start}-{end}: start page must be less than or equal to end page");
        }
        Ok(Self { start, end })
    }

    /// Clamp the end against a document's page count.
    ///
    /// Returns `None` when the span starts beyond the last page.
    pub fn clamp_to(&self, page_count: u32) -> Option<Self> {
        if self.start > page_count {
            return None;
        }
        Some(Self {
            start: self.start,
            end: self.end.min(page_count),
        })
    }
}

/// Document information dictionary fields carried into outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Options shared by all four operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOptions {
    /// Echoed in the outcome so the shell can hand the outputs to its share
    /// facility. Has no effect on file content.
    pub share_after_save: bool,

    /// Merge only: behaviour on unreadable sources.
    pub source_policy: SourcePolicy,

    /// Merge only: add one outline entry per merged source.
    pub bookmarks: bool,
}

/// Complete configuration for one command-line invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory receiving the output files.
    pub output_dir: PathBuf,

    /// Options forwarded to the operation.
    pub options: OperationOptions,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Print the outcome as JSON instead of human-readable text.
    pub json: bool,
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - The output directory does not exist or is not a directory
    pub fn validate(&self) -> crate::Result<()> {
        if self.verbose && self.quiet {
            return Err(PdfMateError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if !self.output_dir.is_dir() {
            return Err(PdfMateError::invalid_config(format!(
                "Output directory does not exist: {}",
                self.output_dir.display()
            )));
        }

        Ok(())
    }

    /// Check if human-readable output should be displayed.
    pub fn should_print(&self) -> bool {
        !self.quiet && !self.json
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            options: OperationOptions::default(),
            verbose: false,
            quiet: false,
            json: false,
        }
    }
}
