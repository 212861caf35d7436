use lopdf::{Dictionary, Object, ObjectId, SaveOptions};
use serde::Serialize;
use std::collections::BTreeSet;

use super::{SerializeOptions, SourceId, XrefForm, filters, graph};
use crate::{PdfMateError, Result};

/// Page boundaries in default user space units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MediaBox {
    /// Lower-left x.
    pub x0: f32,
    /// Lower-left y.
    pub y0: f32,
    /// Upper-right x.
    pub x1: f32,
    /// Upper-right y.
    pub y1: f32,
}

impl MediaBox {
    /// Width in points.
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).abs()
    }

    /// Height in points.
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).abs()
    }

    /// Read a `[x0 y0 x1 y1]` rectangle, resolving indirect entries.
    pub fn from_object(doc: &lopdf::Document, object: &Object) -> Result<Self> {
        let (_, object) = doc.dereference(object)?;
        let items = object
            .as_array()
            .map_err(|_| PdfMateError::malformed("/MediaBox is not an array"))?;
        if items.len() != 4 {
            return Err(PdfMateError::malformed(format!(
                "/MediaBox has {} entries instead of 4",
                items.len()
            )));
        }

        let mut values = [0f32; 4];
        for (slot, item) in values.iter_mut().zip(items) {
            *slot = doc
                .dereference(item)?
                .1
                .as_float()
                .map_err(|_| PdfMateError::malformed("/MediaBox entry is not a number"))?;
        }

        Ok(Self {
            x0: values[0],
            y0: values[1],
            x1: values[2],
            y1: values[3],
        })
    }
}

/// A parsed, structurally valid PDF document.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    inner: lopdf::Document,
    source_id: SourceId,
}

impl PdfDocument {
    /// Parse a complete PDF file.
    ///
    /// Incremental updates and cross-reference streams are followed by the
    /// reader. Stream content stays encoded.
    ///
    /// # Errors
    ///
    /// Returns a parse-class error if the header, trailer or catalog is
    /// missing, the cross-reference data is unreadable, the document is
    /// encrypted, or a reference reachable from the catalog dangles.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let head = &bytes[..bytes.len().min(1024)];
        if !head.windows(5).any(|w| w == b"%PDF-") {
            return Err(PdfMateError::malformed("missing %PDF- header"));
        }

        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| PdfMateError::malformed(e.to_string()))?;
        Self::from_lopdf(inner)
    }

    /// Wrap an in-memory `lopdf` document after validating it.
    pub fn from_lopdf(inner: lopdf::Document) -> Result<Self> {
        if inner.trailer.has(b"Encrypt") {
            return Err(PdfMateError::Encrypted);
        }

        let root = inner
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|_| PdfMateError::malformed("trailer has no /Root reference"))?;
        let catalog = inner.get_dictionary(root).map_err(|_| {
            PdfMateError::malformed(format!(
                "catalog {} {} R is missing or not a dictionary",
                root.0, root.1
            ))
        })?;
        catalog
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|_| PdfMateError::malformed("catalog has no /Pages reference"))?;

        let walk = graph::reachable(&inner.objects, [root]);
        if let Some(&(number, generation)) = walk.dangling.first() {
            return Err(PdfMateError::malformed(format!(
                "reference {number} {generation} R points at a missing object"
            )));
        }

        Ok(Self {
            inner,
            source_id: SourceId::next(),
        })
    }

    /// Identity used to deduplicate imports from this document.
    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    /// Header version, e.g. `"1.7"`.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Number of indirect objects.
    pub fn object_count(&self) -> usize {
        self.inner.objects.len()
    }

    /// Catalog object id.
    pub fn catalog_id(&self) -> Result<ObjectId> {
        Ok(self.inner.trailer.get(b"Root")?.as_reference()?)
    }

    /// Number of pages in the page tree.
    pub fn page_count(&self) -> u32 {
        self.inner.get_pages().len() as u32
    }

    /// Page object ids in page-tree order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().into_values().collect()
    }

    /// Object id of the 1-based page `page_number`.
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&page_number)
            .copied()
            .ok_or(PdfMateError::PageOutOfRange {
                page: page_number,
                total_pages: pages.len() as u32,
            })
    }

    /// MediaBox of a page, taken from the nearest ancestor that defines it.
    pub fn media_box(&self, page_number: u32) -> Result<MediaBox> {
        let page_id = self.page_id(page_number)?;
        let object = self
            .inherited_attribute(page_id, b"MediaBox")
            .ok_or_else(|| {
                PdfMateError::malformed(format!("page {page_number} has no /MediaBox"))
            })?;
        MediaBox::from_object(&self.inner, object)
    }

    /// Decoded content of a page; multiple content streams are joined with a
    /// newline.
    pub fn page_content(&self, page_number: u32) -> Result<Vec<u8>> {
        let page_id = self.page_id(page_number)?;
        let mut content = Vec::new();
        for (i, id) in self.content_stream_ids(page_id)?.into_iter().enumerate() {
            if i > 0 {
                content.push(b'\n');
            }
            content.extend(self.decoded_stream(id)?);
        }
        Ok(content)
    }

    /// Decoded bytes of the stream object `id`.
    pub fn decoded_stream(&self, id: ObjectId) -> Result<Vec<u8>> {
        let stream = self.inner.get_object(id)?.as_stream().map_err(|_| {
            PdfMateError::malformed(format!("object {} {} R is not a stream", id.0, id.1))
        })?;
        filters::decode_stream(&self.inner, stream).map_err(|e| e.for_object(id))
    }

    /// Ids of the content streams of a page, in drawing order.
    pub fn content_stream_ids(&self, page_id: ObjectId) -> Result<Vec<ObjectId>> {
        let page = self.inner.get_dictionary(page_id)?;
        let as_refs = |items: &[Object]| -> Result<Vec<ObjectId>> {
            items
                .iter()
                .map(|item| {
                    item.as_reference().map_err(|_| {
                        PdfMateError::malformed("/Contents array entry is not a reference")
                    })
                })
                .collect()
        };

        match page.get(b"Contents") {
            Err(_) | Ok(Object::Null) => Ok(Vec::new()),
            Ok(Object::Reference(id)) => match self.inner.get_object(*id)? {
                Object::Stream(_) => Ok(vec![*id]),
                Object::Array(items) => as_refs(items),
                _ => Err(PdfMateError::malformed(
                    "/Contents points at neither a stream nor an array",
                )),
            },
            Ok(Object::Array(items)) => as_refs(items),
            Ok(_) => Err(PdfMateError::malformed(
                "/Contents is neither a reference nor an array",
            )),
        }
    }

    /// The document information dictionary, if the trailer has one.
    pub fn info(&self) -> Option<&Dictionary> {
        let object = self.inner.trailer.get(b"Info").ok()?;
        self.inner.dereference(object).ok()?.1.as_dict().ok()
    }

    /// Value of an inheritable page attribute (`MediaBox`, `CropBox`,
    /// `Resources`, `Rotate`) as stored on the page or its nearest ancestor.
    pub(crate) fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut visited = BTreeSet::new();
        let mut current = Some(page_id);

        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let node = self.inner.get_dictionary(id).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value);
            }
            current = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        None
    }

    /// The underlying `lopdf` document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    pub(crate) fn inner_mut(&mut self) -> &mut lopdf::Document {
        &mut self.inner
    }

    /// Serialize to a complete file with a freshly built cross-reference
    /// section.
    ///
    /// Source `/XRef` and `/ObjStm` streams and stale trailer keys are
    /// dropped; only `/Root`, `/Info` and `/ID` survive into the new trailer.
    pub fn serialize(self, options: &SerializeOptions) -> Result<Vec<u8>> {
        let mut source = self.inner;

        let version = match options.xref {
            XrefForm::Stream if !version_at_least(&source.version, 1, 5) => "1.5".to_string(),
            _ => source.version.clone(),
        };

        let mut output = lopdf::Document::with_version(version);
        output.objects = std::mem::take(&mut source.objects);
        output.objects.retain(|_, object| !is_structural(object));
        output.max_id = source.max_id;

        for key in [&b"Root"[..], &b"Info"[..], &b"ID"[..]] {
            let Ok(value) = source.trailer.get(key) else {
                continue;
            };
            if let Object::Reference(id) = value
                && !output.objects.contains_key(id)
            {
                continue;
            }
            output.trailer.set(key.to_vec(), value.clone());
        }

        let mut buffer = Vec::new();
        let written = match options.xref {
            XrefForm::Table => output.save_to(&mut buffer).map_err(|e| e.to_string()),
            XrefForm::Stream => {
                let save_options = SaveOptions::builder()
                    .use_object_streams(true)
                    .use_xref_streams(true)
                    .max_objects_per_stream(100)
                    .compression_level(options.compression_level)
                    .build();
                output
                    .save_with_options(&mut buffer, save_options)
                    .map_err(|e| e.to_string())
            }
        };
        written.map_err(PdfMateError::serialization)?;

        tracing::debug!(
            bytes = buffer.len(),
            objects = output.objects.len(),
            xref = ?options.xref,
            "Serialized document"
        );
        Ok(buffer)
    }
}

fn is_structural(object: &Object) -> bool {
    match object {
        Object::Stream(stream) => matches!(
            stream.dict.get(b"Type").and_then(Object::as_name),
            Ok(b"XRef" | b"ObjStm")
        ),
        _ => false,
    }
}

/// Parse a `major.minor` header version.
pub(crate) fn parse_version(version: &str) -> Option<(u32, u32)> {
    let (major, minor) = version.trim().split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

fn version_at_least(version: &str, major: u32, minor: u32) -> bool {
    parse_version(version).is_some_and(|v| v >= (major, minor))
}
