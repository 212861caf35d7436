//! Destination document assembly.
//!
//! The [`Assembler`] owns an empty document with a single flat page tree and
//! copies extracted pages into it. Objects are renumbered on the way in;
//! objects already imported from the same source are reused, so two pages
//! that share a font produce one copy of the font.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::collections::HashMap;

use crate::error::Result;
use crate::merge::pages::ImportablePage;
use crate::model::{PdfDocument, SourceId, document::parse_version, graph};

/// Builds a new document from pages of one or more sources.
#[derive(Debug)]
pub struct Assembler {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    imported: HashMap<(SourceId, ObjectId), ObjectId>,
    outlines: Option<ObjectId>,
}

impl Assembler {
    /// Start an empty document.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.4");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
            imported: HashMap::new(),
            outlines: None,
        }
    }

    /// Append a page to the end of the page tree.
    ///
    /// Returns the page's object id in the destination.
    pub fn import_page(&mut self, page: &ImportablePage<'_>) -> Result<ObjectId> {
        let source = page.source();
        let source_id = source.source_id();
        let new_page_id = self.document.new_object_id();

        let mut fresh = Vec::new();
        for &id in page.closure() {
            if !self.imported.contains_key(&(source_id, id)) {
                let new_id = self.document.new_object_id();
                self.imported.insert((source_id, id), new_id);
                fresh.push((id, new_id));
            }
        }

        let imported = &self.imported;
        let mut remap = |id: ObjectId| {
            if id == page.page_id() {
                return Object::Reference(new_page_id);
            }
            match imported.get(&(source_id, id)) {
                Some(&new_id) if !page.severed().contains(&id) => Object::Reference(new_id),
                _ => Object::Null,
            }
        };

        for &(old_id, new_id) in &fresh {
            let mut object = source.inner().get_object(old_id)?.clone();
            graph::rewrite_references(&mut object, &mut remap);
            self.document.objects.insert(new_id, object);
        }

        let mut page_object = Object::Dictionary(page.dictionary().clone());
        graph::rewrite_references(&mut page_object, &mut remap);
        if let Object::Dictionary(dict) = &mut page_object {
            dict.set("Parent", self.pages_id);
        }
        self.document.objects.insert(new_page_id, page_object);
        self.kids.push(new_page_id);

        if parse_version(source.version()) > parse_version(&self.document.version) {
            self.document.version = source.version().to_string();
        }

        tracing::debug!(
            page = page.page_number(),
            id = ?new_page_id,
            copied = fresh.len(),
            reused = page.closure().len() - fresh.len(),
            "Imported page"
        );

        Ok(new_page_id)
    }

    /// Pages imported so far.
    pub fn page_count(&self) -> u32 {
        self.kids.len() as u32
    }

    /// Ids of the imported pages, in page-tree order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.kids
    }

    /// Mutable access to the document being built, for outline and metadata
    /// writers.
    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Outline root to link from the catalog.
    pub(crate) fn set_outlines(&mut self, outlines: ObjectId) {
        self.outlines = Some(outlines);
    }

    /// Emit the page tree and catalog and return the finished document.
    pub fn finish(mut self) -> Result<PdfDocument> {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        self.document.objects.insert(
            self.pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.kids.len() as i64,
            }
            .into(),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        };
        if let Some(outlines) = self.outlines {
            catalog.set("Outlines", outlines);
            catalog.set("PageMode", "UseOutlines");
        }
        let catalog_id = self.document.add_object(catalog);
        self.document.trailer.set("Root", catalog_id);

        PdfDocument::from_lopdf(self.document)
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}
