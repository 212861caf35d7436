//! Bookmark (outline) management for merged documents.
//!
//! A merge can add one top-level outline entry per source file, pointing at
//! the first page that source contributed.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

use super::metadata::text_string;

/// Manager for PDF bookmarks (outlines).
#[derive(Debug, Default, Clone, Copy)]
pub struct BookmarkManager;

impl BookmarkManager {
    /// Create a new bookmark manager.
    pub fn new() -> Self {
        Self
    }

    /// Bookmark title for a source file: its file stem.
    pub fn title_for(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Add a flat outline with one entry per `(title, page)` pair.
    ///
    /// Returns the id of the outline root, or `None` when `items` is empty.
    /// The caller links the root from the catalog.
    pub fn create_outline(
        &self,
        doc: &mut Document,
        items: &[(String, ObjectId)],
    ) -> Option<ObjectId> {
        if items.is_empty() {
            return None;
        }

        let outline_id = doc.new_object_id();
        let item_ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

        for (i, ((title, page_id), &item_id)) in items.iter().zip(&item_ids).enumerate() {
            let mut item = Dictionary::new();
            item.set("Title", text_string(title));
            item.set("Parent", outline_id);
            item.set(
                "Dest",
                vec![
                    Object::Reference(*page_id),
                    Object::Name(b"XYZ".to_vec()),
                    Object::Null,
                    Object::Null,
                    Object::Null,
                ],
            );
            if i > 0 {
                item.set("Prev", item_ids[i - 1]);
            }
            if let Some(&next) = item_ids.get(i + 1) {
                item.set("Next", next);
            }
            doc.objects.insert(item_id, Object::Dictionary(item));
        }

        let mut outline = Dictionary::new();
        outline.set("Type", Object::Name(b"Outlines".to_vec()));
        outline.set("Count", item_ids.len() as i64);
        if let (Some(&first), Some(&last)) = (item_ids.first(), item_ids.last()) {
            outline.set("First", first);
            outline.set("Last", last);
        }
        doc.objects.insert(outline_id, Object::Dictionary(outline));

        tracing::debug!(entries = items.len(), "Created outline");
        Some(outline_id)
    }
}
