//! PDF metadata management.
//!
//! This module handles the document information dictionary of output files:
//! - Title, Author, Subject, Keywords carried over from a source
//! - Producer and modification date stamped on every output

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::config::Metadata;
use crate::error::{PdfMateError, Result};

/// Producer string written into every output.
pub const PRODUCER: &str = "pdfmate";

/// Manager for PDF metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Write `metadata` into the document and stamp it.
    ///
    /// Only non-empty fields are set; existing entries are kept otherwise.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmate::merge::MetadataManager;
    /// # use pdfmate::config::Metadata;
    /// # use lopdf::Document;
    /// # fn example(mut doc: Document) -> pdfmate::Result<()> {
    /// let manager = MetadataManager::new();
    /// let metadata = Metadata::new(Some("Quarterly report".to_string()), None, None, None);
    /// manager.apply(&mut doc, &metadata)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn apply(&self, doc: &mut Document, metadata: &Metadata) -> Result<()> {
        let info = info_dictionary_mut(doc)?;

        let fields = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
            ("Keywords", &metadata.keywords),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                info.set(key, text_string(value));
            }
        }

        stamp_dictionary(info, Utc::now());
        Ok(())
    }

    /// Set `Producer` and `ModDate`, keeping every other Info entry.
    pub fn stamp(&self, doc: &mut Document) -> Result<()> {
        stamp_dictionary(info_dictionary_mut(doc)?, Utc::now());
        Ok(())
    }

    /// Read the descriptive fields of a document's Info dictionary.
    pub fn get_metadata(&self, doc: &Document) -> Metadata {
        let Some(info) = doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|object| doc.dereference(object).ok())
            .and_then(|(_, object)| object.as_dict().ok())
        else {
            return Metadata::default();
        };

        Metadata::new(
            read_text(info, b"Title"),
            read_text(info, b"Author"),
            read_text(info, b"Subject"),
            read_text(info, b"Keywords"),
        )
    }
}

/// The Info dictionary of `doc`, created if the trailer has none.
fn info_dictionary_mut(doc: &mut Document) -> Result<&mut Dictionary> {
    let existing = doc
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok()
        .filter(|id| matches!(doc.objects.get(id), Some(Object::Dictionary(_))));

    let info_id: ObjectId = match existing {
        Some(id) => id,
        None => {
            let id = doc.add_object(Dictionary::new());
            doc.trailer.set("Info", id);
            id
        }
    };

    doc.get_object_mut(info_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfMateError::malformed(format!("Info dictionary unavailable: {e}")))
}

fn stamp_dictionary(info: &mut Dictionary, now: DateTime<Utc>) {
    info.set("Producer", text_string(PRODUCER));
    info.set("ModDate", text_string(&format_pdf_date(now)));
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
pub fn format_pdf_date(time: DateTime<Utc>) -> String {
    time.format("D:%Y%m%d%H%M%SZ").to_string()
}

/// Encode a text string: literal for ASCII, UTF-16BE with BOM otherwise.
pub(crate) fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn read_text(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let Ok(Object::String(bytes, _)) = dict.get(key) else {
        return None;
    };

    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            Some(String::from_utf16_lossy(&units))
        }
        None => Some(bytes.iter().map(|&b| b as char).collect()),
    }
}
