//! Error types for pdfmate.
//!
//! Every failure surfaced by the library is a [`PdfMateError`]. Each variant
//! belongs to exactly one [`ErrorKind`], which is what a host shell receives
//! (together with the rendered message) through [`ErrorReport`].
//!
//! # Error Categories
//!
//! - **Parse**: malformed, truncated, encrypted or otherwise unreadable sources
//! - **Index**: page numbers or ranges outside the document
//! - **Encoding**: stream filter chains that cannot be decoded or re-encoded
//! - **Io**: filesystem open/read/write failures
//! - **Argument**: invalid operation arguments or configuration

use lopdf::ObjectId;
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmate operations.
pub type Result<T> = std::result::Result<T, PdfMateError>;

/// Coarse classification handed to the host shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or unreadable source.
    Parse,
    /// Page index or range outside the document bounds.
    Index,
    /// Stream filter chain could not be decoded or re-encoded.
    Encoding,
    /// Filesystem failure.
    Io,
    /// Invalid arguments passed to an operation.
    Argument,
    /// Failure of the runtime itself (e.g. a worker task panicked).
    Internal,
}

/// Main error type for pdfmate operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfMateError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file exists but could not be read.
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// Bytes do not form a readable PDF. Raised by the object model before a
    /// path is known; [`PdfMateError::at_path`] upgrades it to `CorruptedPdf`.
    #[error("Malformed PDF: {details}")]
    MalformedPdf {
        /// What is wrong with the structure.
        details: String,
    },

    /// A PDF file on disk is corrupted or has invalid structure.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", path.display())]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// Document carries an /Encrypt dictionary.
    #[error("PDF is encrypted and cannot be processed")]
    Encrypted,

    /// PDF file on disk is encrypted.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// A single page number outside `[1, total_pages]`.
    #[error("Page {page} does not exist; the document has {total_pages} page(s)")]
    PageOutOfRange {
        /// Requested 1-based page number.
        page: u32,
        /// Pages in the document.
        total_pages: u32,
    },

    /// A page range that selects nothing valid in the document.
    #[error(
        "Invalid page range '{range}' for PDF: {}\n  \
         PDF has {total_pages} page(s). Page numbers must be between 1 and {total_pages}",
        path.display()
    )]
    InvalidPageRange {
        /// Path to the PDF file.
        path: PathBuf,
        /// Requested page range.
        range: String,
        /// Total pages in the PDF.
        total_pages: u32,
    },

    /// A stream could not be pushed through its filter chain.
    #[error("Cannot decode stream {} {} R through {filter}: {reason}", object.0, object.1)]
    StreamEncoding {
        /// Object id of the stream, `(0, 0)` for detached streams.
        object: ObjectId,
        /// Filter that failed.
        filter: String,
        /// Why it failed.
        reason: String,
    },

    /// A filter the codec does not implement.
    #[error("Unsupported stream filter: {filter}")]
    UnsupportedFilter {
        /// Filter name.
        filter: String,
    },

    /// No sources were left to merge.
    #[error("No input files to merge")]
    NoFilesToMerge,

    /// Failed to create an output or temporary file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write or publish an output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The writer could not serialize the document.
    #[error("Failed to serialize PDF: {reason}")]
    SerializationFailed {
        /// Writer error.
        reason: String,
    },

    /// Invalid configuration or operation argument.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong.
        message: String,
    },

    /// Background task failed to complete.
    #[error("Worker task failed: {reason}")]
    TaskFailed {
        /// Join error description.
        reason: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl From<lopdf::Error> for PdfMateError {
    fn from(err: lopdf::Error) -> Self {
        Self::malformed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for PdfMateError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed {
            reason: err.to_string(),
        }
    }
}

impl PdfMateError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a MalformedPdf error.
    pub fn malformed(details: impl Into<String>) -> Self {
        Self::MalformedPdf {
            details: details.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create a StreamEncoding error.
    pub fn stream_encoding(
        object: ObjectId,
        filter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::StreamEncoding {
            object,
            filter: filter.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationFailed error.
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::SerializationFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Attach the source path to errors raised while parsing bytes.
    pub fn at_path(self, path: PathBuf) -> Self {
        match self {
            Self::MalformedPdf { details } => Self::CorruptedPdf { path, details },
            Self::Encrypted => Self::EncryptedPdf { path },
            other => other,
        }
    }

    /// Attach an object id to a codec error raised on a detached stream.
    pub fn for_object(self, id: ObjectId) -> Self {
        match self {
            Self::StreamEncoding { filter, reason, .. } => Self::StreamEncoding {
                object: id,
                filter,
                reason,
            },
            other => other,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedPdf { .. }
            | Self::CorruptedPdf { .. }
            | Self::Encrypted
            | Self::EncryptedPdf { .. } => ErrorKind::Parse,
            Self::PageOutOfRange { .. } | Self::InvalidPageRange { .. } => ErrorKind::Index,
            Self::StreamEncoding { .. }
            | Self::UnsupportedFilter { .. }
            | Self::SerializationFailed { .. } => ErrorKind::Encoding,
            Self::FileNotFound { .. }
            | Self::FileNotAccessible { .. }
            | Self::NotAFile { .. }
            | Self::FailedToCreateOutput { .. }
            | Self::FailedToWrite { .. }
            | Self::Io { .. } => ErrorKind::Io,
            Self::NoFilesToMerge | Self::InvalidConfig { .. } => ErrorKind::Argument,
            Self::TaskFailed { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error only concerns one source of a multi-source merge.
    ///
    /// Under `SourcePolicy::Skip` these errors skip the source instead of
    /// aborting the batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::FileNotAccessible { .. }
                | Self::NotAFile { .. }
                | Self::CorruptedPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::StreamEncoding { .. }
                | Self::UnsupportedFilter { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Argument => 1,
            ErrorKind::Io => match self {
                Self::FailedToCreateOutput { .. } | Self::FailedToWrite { .. } => 5,
                _ => 2,
            },
            ErrorKind::Parse => 3,
            ErrorKind::Index => 4,
            ErrorKind::Encoding => 6,
            ErrorKind::Internal => 70,
        }
    }
}

/// Structured error handed to the host shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Error classification.
    pub kind: ErrorKind,
    /// Rendered message.
    pub message: String,
}

impl From<&PdfMateError> for ErrorReport {
    fn from(err: &PdfMateError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
