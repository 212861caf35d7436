//! In-memory fixture documents for unit tests.

use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use crate::model::filters::encode_flate;

/// Text drawn on page `n` of a fixture labelled `label`.
pub(crate) fn page_text(label: &str, n: u32) -> String {
    format!("BT /F1 24 Tf 72 720 Td ({label} page {n}) Tj ET")
}

/// Builds small multi-page documents whose pages share one font.
#[derive(Debug, Clone)]
pub(crate) struct FixtureBuilder {
    pages: u32,
    label: String,
    media_box: [f32; 4],
    inherited: bool,
    compressed: bool,
    repeat: usize,
    title: Option<String>,
}

impl FixtureBuilder {
    pub(crate) fn new(pages: u32) -> Self {
        Self {
            pages,
            label: "fixture".to_string(),
            media_box: [0.0, 0.0, 612.0, 792.0],
            inherited: false,
            compressed: false,
            repeat: 1,
            title: Some("Fixture".to_string()),
        }
    }

    pub(crate) fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub(crate) fn media_box(mut self, media_box: [f32; 4]) -> Self {
        self.media_box = media_box;
        self
    }

    /// Put MediaBox and Resources on the page tree root instead of the pages.
    pub(crate) fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    /// Deflate the content streams.
    pub(crate) fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    /// Repeat the drawing text `times` times per page.
    pub(crate) fn repeat(mut self, times: usize) -> Self {
        self.repeat = times.max(1);
        self
    }

    /// Decoded content of page `n`.
    pub(crate) fn content_for(&self, n: u32) -> Vec<u8> {
        vec![page_text(&self.label, n); self.repeat]
            .join("\n")
            .into_bytes()
    }

    pub(crate) fn build(&self) -> Document {
        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let media_box: Vec<Object> = self.media_box.iter().map(|&v| Object::Real(v)).collect();

        let mut kids: Vec<Object> = Vec::new();
        for n in 1..=self.pages {
            let text = self.content_for(n);
            let content = if self.compressed {
                let encoded = encode_flate(&text, 6).unwrap_or(text);
                Stream::new(dictionary! { "Filter" => "FlateDecode" }, encoded)
            } else {
                Stream::new(dictionary! {}, text)
            };
            let content_id = doc.add_object(content);

            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if !self.inherited {
                page.set("MediaBox", media_box.clone());
                page.set("Resources", resources_id);
            }
            kids.push(doc.add_object(page).into());
        }

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.pages as i64,
        };
        if self.inherited {
            pages.set("MediaBox", media_box);
            pages.set("Resources", resources_id);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title.as_str()),
                "Author" => Object::string_literal("pdfmate tests"),
            });
            doc.trailer.set("Info", info_id);
        }

        doc
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut doc = self.build();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}

/// Id of the shared font of a fixture built by [`FixtureBuilder`].
pub(crate) fn font_id(doc: &Document) -> ObjectId {
    doc.objects
        .iter()
        .find(|(_, object)| {
            object
                .as_dict()
                .and_then(|d| d.get(b"Type"))
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Font")
        })
        .map(|(id, _)| *id)
        .unwrap()
}

/// Offset named by the last `startxref` of `bytes`.
pub(crate) fn startxref(bytes: &[u8]) -> usize {
    let at = bytes
        .windows(9)
        .rposition(|w| w == b"startxref")
        .unwrap();
    String::from_utf8_lossy(&bytes[at + 9..])
        .split_whitespace()
        .next()
        .unwrap()
        .parse()
        .unwrap()
}

/// Append an incremental update redefining `id` as an unfiltered stream.
///
/// The new trailer chains to `prev`, or to its own xref section when `prev`
/// is `None`.
pub(crate) fn append_update(
    bytes: &[u8],
    id: ObjectId,
    content: &[u8],
    root: ObjectId,
    size: u32,
    prev: Option<usize>,
) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.push(b'\n');

    let object_at = out.len();
    out.extend(format!("{} {} obj\n<< /Length {} >>\nstream\n", id.0, id.1, content.len()).bytes());
    out.extend_from_slice(content);
    out.extend_from_slice(b"\nendstream\nendobj\n");

    let xref_at = out.len();
    let prev = prev.unwrap_or(xref_at);
    out.extend(
        format!(
            "xref\n{} 1\n{object_at:010} {:05} n \ntrailer\n<< /Size {size} /Root {} {} R /Prev {prev} >>\nstartxref\n{xref_at}\n%%EOF\n",
            id.0, id.1, root.0, root.1
        )
        .bytes(),
    );
    out
}
