//! Document summary for the `info` command.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Metadata;
use crate::error::Result;
use crate::io::PdfReader;
use crate::merge::MetadataManager;
use crate::model::{MediaBox, XrefForm};

/// What `inspect` reports about a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    /// Inspected path.
    pub path: PathBuf,
    /// Header version, e.g. `"1.7"`.
    pub version: String,
    /// Number of pages.
    pub page_count: u32,
    /// Number of indirect objects.
    pub object_count: usize,
    /// File size in bytes.
    pub file_size: u64,
    /// MediaBox of the first page, if there is one.
    pub first_page: Option<MediaBox>,
    /// Layout of the last cross-reference section.
    pub xref_form: Option<XrefForm>,
    /// Descriptive Info dictionary fields.
    pub metadata: Metadata,
}

impl DocumentInfo {
    /// Whether the file ends with a cross-reference stream.
    pub fn has_xref_stream(&self) -> bool {
        self.xref_form == Some(XrefForm::Stream)
    }
}

/// Read `path` and summarize it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn inspect(path: &Path) -> Result<DocumentInfo> {
    let loaded = PdfReader::new().load(path).await?;
    let document = &loaded.document;

    let first_page = match document.page_count() {
        0 => None,
        _ => Some(document.media_box(1)?),
    };

    Ok(DocumentInfo {
        path: loaded.path.clone(),
        version: document.version().to_string(),
        page_count: loaded.page_count,
        object_count: document.object_count(),
        file_size: loaded.file_size,
        first_page,
        xref_form: loaded.xref_form,
        metadata: MetadataManager::new().get_metadata(document.inner()),
    })
}
