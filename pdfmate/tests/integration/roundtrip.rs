//! Serialization round-trips, inspection and concurrent operations.

use pdfmate::CompressionLevel;
use pdfmate::config::OperationOptions;
use pdfmate::model::{MediaBox, PdfDocument, SerializeOptions, XrefForm, xref_form_of};
use rstest::rstest;
use std::collections::HashSet;

use crate::common::{Fixture, Workspace};

#[rstest]
#[case::table_plain(XrefForm::Table, false)]
#[case::table_deflated(XrefForm::Table, true)]
#[case::stream_plain(XrefForm::Stream, false)]
#[case::stream_deflated(XrefForm::Stream, true)]
fn test_parse_serialize_parse(#[case] xref: XrefForm, #[case] compressed: bool) {
    let mut fixture = Fixture::new(4, "rt").media_box([0.0, 0.0, 420.0, 595.0]);
    if compressed {
        fixture = fixture.compressed();
    }

    let original = PdfDocument::parse(&fixture.to_bytes()).unwrap();
    let bytes = original
        .clone()
        .serialize(&SerializeOptions {
            xref,
            compression_level: 6,
        })
        .unwrap();
    assert_eq!(xref_form_of(&bytes), Some(xref));

    let reparsed = PdfDocument::parse(&bytes).unwrap();
    assert_eq!(reparsed.page_count(), original.page_count());
    for n in 1..=4 {
        assert_eq!(reparsed.media_box(n).unwrap(), original.media_box(n).unwrap());
        assert_eq!(reparsed.page_content(n).unwrap(), fixture.content(n));
    }
}

#[tokio::test]
async fn test_inspect_reports_structure() {
    let ws = Workspace::new();
    let source = Fixture::new(2, "info")
        .media_box([0.0, 0.0, 595.0, 842.0])
        .title("Inspected")
        .write(ws.input_dir(), "info.pdf");

    let info = pdfmate::inspect(&source).await.unwrap();

    assert_eq!(info.page_count, 2);
    assert_eq!(info.version, "1.4");
    assert_eq!(
        info.first_page,
        Some(MediaBox {
            x0: 0.0,
            y0: 0.0,
            x1: 595.0,
            y1: 842.0
        })
    );
    assert!(!info.has_xref_stream());
    assert_eq!(info.metadata.title.as_deref(), Some("Inspected"));
    assert_eq!(info.file_size, std::fs::metadata(&source).unwrap().len());
}

#[tokio::test]
async fn test_inspect_sees_xref_stream_after_compress() {
    let ws = Workspace::new();
    let source = Fixture::new(1, "x").write(ws.input_dir(), "x.pdf");

    let outcome = pdfmate::compress(
        &source,
        CompressionLevel::Normal,
        ws.output_dir(),
        &OperationOptions::default(),
    )
    .await
    .unwrap();

    let info = pdfmate::inspect(&outcome.outputs[0].path).await.unwrap();
    assert!(info.has_xref_stream());
    assert_eq!(info.page_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_operations_use_distinct_outputs() {
    let ws = Workspace::new();
    let a = Fixture::new(6, "a").write(ws.input_dir(), "a.pdf");
    let b = Fixture::new(4, "b").repeat(20).write(ws.input_dir(), "b.pdf");
    let options = OperationOptions::default();
    let out = ws.output_dir();

    let sources = [a.clone(), b.clone()];
    let (split, compressed, merged_1, merged_2) = tokio::join!(
        pdfmate::split_by_count(&a, 2, out, &options),
        pdfmate::compress(&b, CompressionLevel::High, out, &options),
        pdfmate::merge(&sources, out, &options),
        pdfmate::merge(&sources, out, &options),
    );

    let outcomes = [split.unwrap(), compressed.unwrap(), merged_1.unwrap(), merged_2.unwrap()];
    let paths: Vec<_> = outcomes
        .iter()
        .flat_map(|o| o.outputs.iter().map(|f| f.path.clone()))
        .collect();
    let unique: HashSet<_> = paths.iter().collect();

    assert_eq!(paths.len(), 3 + 1 + 1 + 1);
    assert_eq!(unique.len(), paths.len());
    assert_eq!(ws.output_names().len(), paths.len());
    assert_eq!(outcomes[2].total_pages(), 10);
    assert_eq!(outcomes[3].total_pages(), 10);
}
