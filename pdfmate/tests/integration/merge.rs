//! Merge through the public operation.

use pdfmate::config::{OperationOptions, SourcePolicy};
use pdfmate::model::MediaBox;
use pdfmate::{ErrorKind, PdfMateError};
use rstest::rstest;
use std::path::PathBuf;

use crate::common::{Fixture, Workspace, count_fonts, info_string, load};

#[tokio::test]
async fn test_merge_preserves_order_and_page_count() {
    let ws = Workspace::new();
    let fixtures = [
        Fixture::new(2, "a"),
        Fixture::new(3, "b").compressed(),
        Fixture::new(4, "c").media_box([0.0, 0.0, 595.0, 842.0]),
    ];
    let sources: Vec<PathBuf> = fixtures
        .iter()
        .map(|f| f.write(ws.input_dir(), &format!("{}.pdf", f.label)))
        .collect();

    let outcome = pdfmate::merge(&sources, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.outputs.len(), 1);
    assert_eq!(outcome.outputs[0].pages, 9);
    assert!(outcome.skipped.is_empty());

    let merged = load(&outcome.outputs[0].path);
    assert_eq!(merged.page_count(), 9);

    let mut n = 1;
    for fixture in &fixtures {
        for page in 1..=fixture.pages {
            assert_eq!(merged.page_content(n).unwrap(), fixture.content(page));
            let [x0, y0, x1, y1] = fixture.media_box;
            assert_eq!(merged.media_box(n).unwrap(), MediaBox { x0, y0, x1, y1 });
            n += 1;
        }
    }
}

#[tokio::test]
async fn test_merge_output_name_and_metadata() {
    let ws = Workspace::new();
    let first = Fixture::new(1, "a").title("First").write(ws.input_dir(), "a.pdf");
    let second = Fixture::new(1, "b").title("Second").write(ws.input_dir(), "b.pdf");

    let options = OperationOptions {
        share_after_save: true,
        ..Default::default()
    };
    let outcome = pdfmate::merge(&[first, second], ws.output_dir(), &options)
        .await
        .unwrap();

    let name = outcome.outputs[0].path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("merged_pdf_"), "unexpected name {name}");
    assert!(name.ends_with(".pdf"));
    assert!(outcome.share_after_save);
    assert_eq!(ws.output_names(), vec![name]);

    let merged = load(&outcome.outputs[0].path);
    assert_eq!(info_string(&merged, b"Title").as_deref(), Some("First"));
    assert_eq!(info_string(&merged, b"Producer").as_deref(), Some("pdfmate"));
}

#[tokio::test]
async fn test_merge_deduplicates_shared_font() {
    let ws = Workspace::new();
    let source = Fixture::new(5, "shared").write(ws.input_dir(), "shared.pdf");

    let outcome = pdfmate::merge(&[source], ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap();

    assert_eq!(count_fonts(&load(&outcome.outputs[0].path)), 1);
}

#[tokio::test]
async fn test_merge_with_bookmarks() {
    let ws = Workspace::new();
    let a = Fixture::new(2, "a").write(ws.input_dir(), "intro.pdf");
    let b = Fixture::new(3, "b").write(ws.input_dir(), "body.pdf");

    let options = OperationOptions {
        bookmarks: true,
        ..Default::default()
    };
    let outcome = pdfmate::merge(&[a, b], ws.output_dir(), &options).await.unwrap();

    let merged = load(&outcome.outputs[0].path);
    let doc = merged.inner();
    let catalog = doc.get_dictionary(merged.catalog_id().unwrap()).unwrap();
    let outlines_id = catalog.get(b"Outlines").unwrap().as_reference().unwrap();
    let outlines = doc.get_dictionary(outlines_id).unwrap();
    assert_eq!(outlines.get(b"Count").unwrap().as_i64().unwrap(), 2);

    let last = outlines.get(b"Last").unwrap().as_reference().unwrap();
    let last_item = doc.get_dictionary(last).unwrap();
    let dest = last_item.get(b"Dest").unwrap().as_array().unwrap();
    // Second source starts at page 3.
    assert_eq!(dest[0].as_reference().unwrap(), merged.page_id(3).unwrap());
}

#[rstest]
#[case::missing_first(0)]
#[case::missing_middle(1)]
#[case::missing_last(2)]
#[tokio::test]
async fn test_merge_abort_on_missing_source(#[case] missing: usize) {
    let ws = Workspace::new();
    let mut sources: Vec<PathBuf> = (0..3)
        .map(|i| Fixture::new(1, "s").write(ws.input_dir(), &format!("{i}.pdf")))
        .collect();
    sources[missing] = ws.input_dir().join("does-not-exist.pdf");

    let err = pdfmate::merge(&sources, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PdfMateError::FileNotFound { .. }));
    assert!(ws.output_names().is_empty());
}

#[tokio::test]
async fn test_merge_skip_reports_missing_and_corrupt_sources() {
    let ws = Workspace::new();
    let good = Fixture::new(2, "good").write(ws.input_dir(), "good.pdf");
    let missing = ws.input_dir().join("missing.pdf");
    let corrupt = ws.input_dir().join("corrupt.pdf");
    std::fs::write(&corrupt, b"%PDF-1.4\nthis is not really a pdf").unwrap();
    let broken = Fixture::new(2, "broken")
        .broken_page(2)
        .write(ws.input_dir(), "broken.pdf");

    let options = OperationOptions {
        source_policy: SourcePolicy::Skip,
        ..Default::default()
    };
    let sources = vec![missing.clone(), good, corrupt.clone(), broken.clone()];
    let outcome = pdfmate::merge(&sources, ws.output_dir(), &options).await.unwrap();

    assert_eq!(outcome.outputs[0].pages, 2);
    let skipped: Vec<(PathBuf, ErrorKind)> = outcome
        .skipped
        .iter()
        .map(|s| (s.path.clone(), s.error.kind))
        .collect();
    assert_eq!(
        skipped,
        vec![
            (missing, ErrorKind::Io),
            (corrupt, ErrorKind::Parse),
            (broken, ErrorKind::Encoding),
        ]
    );
}

#[tokio::test]
async fn test_merge_all_sources_skipped() {
    let ws = Workspace::new();
    let options = OperationOptions {
        source_policy: SourcePolicy::Skip,
        ..Default::default()
    };
    let sources = vec![ws.input_dir().join("a.pdf"), ws.input_dir().join("b.pdf")];

    let err = pdfmate::merge(&sources, ws.output_dir(), &options).await.unwrap_err();

    assert!(matches!(err, PdfMateError::NoFilesToMerge));
    assert!(ws.output_names().is_empty());
}

#[tokio::test]
async fn test_merge_empty_source_list() {
    let ws = Workspace::new();
    let err = pdfmate::merge(&[], ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Argument);
}
