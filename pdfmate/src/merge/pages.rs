//! Page extraction.
//!
//! This module turns one page of a parsed document into an
//! [`ImportablePage`]: a standalone page dictionary plus the ordered set of
//! objects it depends on. It handles:
//! - Materializing inherited page attributes
//! - Collecting the transitive resource closure
//! - Severing references into foreign parts of the page tree

use lopdf::{Dictionary, Object, ObjectId};
use std::collections::BTreeSet;

use crate::error::{PdfMateError, Result};
use crate::model::{MediaBox, PdfDocument, graph};

/// Page attributes a page may take from an ancestor `Pages` node.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// A page ready to be imported into another document.
#[derive(Debug, Clone)]
pub struct ImportablePage<'a> {
    source: &'a PdfDocument,
    page_id: ObjectId,
    page_number: u32,
    dictionary: Dictionary,
    closure: Vec<ObjectId>,
    severed: BTreeSet<ObjectId>,
    media_box: MediaBox,
}

impl<'a> ImportablePage<'a> {
    /// Document the page comes from.
    pub fn source(&self) -> &'a PdfDocument {
        self.source
    }

    /// Object id of the page in its source.
    pub fn page_id(&self) -> ObjectId {
        self.page_id
    }

    /// 1-based page number in its source.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Page dictionary with inherited attributes materialized and `/Parent`
    /// removed. References still use source numbering.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Every object the page transitively references, in discovery order.
    pub fn closure(&self) -> &[ObjectId] {
        &self.closure
    }

    /// Referenced pages and page-tree nodes that are not imported.
    pub fn severed(&self) -> &BTreeSet<ObjectId> {
        &self.severed
    }

    /// Page boundaries, unchanged from the source.
    pub fn media_box(&self) -> MediaBox {
        self.media_box
    }
}

/// Extracts importable pages from parsed documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageExtractor;

impl PageExtractor {
    /// Create a new page extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract page `page_number` (1-based) from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `page_number` is outside `[1, page_count]`
    /// - the page has no MediaBox, directly or inherited
    /// - a referenced object is missing
    /// - a content stream cannot be decoded through its filter chain
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmate::merge::PageExtractor;
    /// # use pdfmate::model::PdfDocument;
    /// # fn example(doc: PdfDocument) -> pdfmate::Result<()> {
    /// let page = PageExtractor::new().extract(&doc, 1)?;
    /// println!("page 1 depends on {} objects", page.closure().len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn extract<'a>(
        &self,
        source: &'a PdfDocument,
        page_number: u32,
    ) -> Result<ImportablePage<'a>> {
        let page_id = source.page_id(page_number)?;
        let doc = source.inner();

        let mut dictionary = doc.get_dictionary(page_id)?.clone();
        for key in INHERITABLE {
            if !dictionary.has(key)
                && let Some(value) = source.inherited_attribute(page_id, key)
            {
                dictionary.set(key.to_vec(), value.clone());
            }
        }
        dictionary.remove(b"Parent");

        let media_box = match dictionary.get(b"MediaBox") {
            Ok(object) => MediaBox::from_object(doc, object)?,
            Err(_) => {
                return Err(PdfMateError::malformed(format!(
                    "page {page_number} has no /MediaBox"
                )));
            }
        };

        let (closure, severed) = collect_closure(source, page_id, &dictionary)?;

        for id in source.content_stream_ids(page_id)? {
            source.decoded_stream(id)?;
        }

        tracing::debug!(
            page = page_number,
            objects = closure.len(),
            severed = severed.len(),
            "Extracted page"
        );

        Ok(ImportablePage {
            source,
            page_id,
            page_number,
            dictionary,
            closure,
            severed,
            media_box,
        })
    }
}

fn collect_closure(
    source: &PdfDocument,
    page_id: ObjectId,
    dictionary: &Dictionary,
) -> Result<(Vec<ObjectId>, BTreeSet<ObjectId>)> {
    let doc = source.inner();
    let mut closure = Vec::new();
    let mut severed = BTreeSet::new();
    let mut visited = BTreeSet::from([page_id]);

    let mut worklist: Vec<ObjectId> = dictionary
        .iter()
        .flat_map(|(_, value)| graph::references(value))
        .collect();
    worklist.reverse();

    while let Some(id) = worklist.pop() {
        if !visited.insert(id) {
            continue;
        }
        let object = doc.get_object(id).map_err(|_| {
            PdfMateError::malformed(format!(
                "reference {} {} R points at a missing object",
                id.0, id.1
            ))
        })?;

        if is_page_tree_node(object) {
            severed.insert(id);
            continue;
        }

        closure.push(id);
        let mut next = graph::references(object);
        next.retain(|r| !visited.contains(r));
        next.reverse();
        worklist.extend(next);
    }

    Ok((closure, severed))
}

fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Page" || name == b"Pages")
}
