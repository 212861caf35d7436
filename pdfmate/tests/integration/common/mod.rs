//! Shared helpers for the integration tests.
//!
//! Fixture PDFs are built in memory with lopdf and written into a temporary
//! directory, so the tests carry no binary fixtures.

#![allow(dead_code)]

use lopdf::{Document, Object, Stream, dictionary};
use pdfmate::model::PdfDocument;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Text drawn on page `n` of a fixture labelled `label`.
pub fn page_text(label: &str, n: u32) -> String {
    format!("BT /F1 24 Tf 72 720 Td ({label} page {n}) Tj ET")
}

/// Description of a fixture document.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub pages: u32,
    pub label: String,
    pub media_box: [f32; 4],
    pub compressed: bool,
    pub repeat: usize,
    pub title: &'static str,
    /// Page whose content stream is replaced by bytes that do not inflate.
    pub broken_page: Option<u32>,
    /// Attach an undecodable stream to the catalog.
    pub broken_extra_stream: bool,
}

impl Fixture {
    pub fn new(pages: u32, label: &str) -> Self {
        Self {
            pages,
            label: label.to_string(),
            media_box: [0.0, 0.0, 612.0, 792.0],
            compressed: false,
            repeat: 1,
            title: "Fixture",
            broken_page: None,
            broken_extra_stream: false,
        }
    }

    pub fn media_box(mut self, media_box: [f32; 4]) -> Self {
        self.media_box = media_box;
        self
    }

    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    pub fn repeat(mut self, times: usize) -> Self {
        self.repeat = times;
        self
    }

    pub fn title(mut self, title: &'static str) -> Self {
        self.title = title;
        self
    }

    pub fn broken_page(mut self, page: u32) -> Self {
        self.broken_page = Some(page);
        self
    }

    pub fn broken_extra_stream(mut self) -> Self {
        self.broken_extra_stream = true;
        self
    }

    /// Decoded content of page `n`.
    pub fn content(&self, n: u32) -> Vec<u8> {
        vec![page_text(&self.label, n); self.repeat.max(1)]
            .join("\n")
            .into_bytes()
    }

    pub fn build(&self) -> Document {
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
            let content = if self.broken_page == Some(n) {
                Stream::new(
                    dictionary! { "Filter" => "FlateDecode" },
                    b"not a deflate stream".to_vec(),
                )
            } else if self.compressed {
                Stream::new(dictionary! { "Filter" => "FlateDecode" }, deflate(&self.content(n)))
            } else {
                Stream::new(dictionary! {}, self.content(n))
            };
            let content_id = doc.add_object(content);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.pages as i64,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if self.broken_extra_stream {
            let broken = doc.add_object(Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                b"garbage that is not zlib".to_vec(),
            ));
            catalog.set("PieceInfo", broken);
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(self.title),
            "Author" => Object::string_literal("pdfmate tests"),
        });
        doc.trailer.set("Info", info_id);

        doc
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.build().save_to(&mut bytes).unwrap();
        bytes
    }

    /// Write the fixture to `dir/name`.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Two temporary directories: one for sources, one for outputs.
pub struct Workspace {
    pub inputs: TempDir,
    pub outputs: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            inputs: TempDir::new().unwrap(),
            outputs: TempDir::new().unwrap(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        self.inputs.path()
    }

    pub fn output_dir(&self) -> &Path {
        self.outputs.path()
    }

    /// Sorted file names currently in the output directory, hidden files
    /// included.
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.output_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Parse a PDF from disk.
pub fn load(path: &Path) -> PdfDocument {
    PdfDocument::parse(&std::fs::read(path).unwrap()).unwrap()
}

/// Number of font dictionaries in a document.
pub fn count_fonts(doc: &PdfDocument) -> usize {
    doc.inner()
        .objects
        .values()
        .filter(|object| {
            object
                .as_dict()
                .and_then(|d| d.get(b"Type"))
                .and_then(Object::as_name)
                .is_ok_and(|name| name == b"Font")
        })
        .count()
}

/// A string entry of the Info dictionary.
pub fn info_string(doc: &PdfDocument, key: &[u8]) -> Option<String> {
    match doc.info()?.get(key).ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}
