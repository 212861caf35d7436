//! Split-by-count and split-by-range through the public operations.

use pdfmate::config::OperationOptions;
use pdfmate::{ErrorKind, PdfMateError};
use rstest::rstest;

use crate::common::{Fixture, Workspace, load};

#[tokio::test]
async fn test_split_ten_pages_by_three() {
    let ws = Workspace::new();
    let fixture = Fixture::new(10, "book");
    let source = fixture.write(ws.input_dir(), "book.pdf");

    let outcome = pdfmate::split_by_count(&source, 3, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap();

    let sizes: Vec<u32> = outcome.outputs.iter().map(|o| o.pages).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);

    let mut page = 1;
    for (k, output) in outcome.outputs.iter().enumerate() {
        let name = output.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(
            name.starts_with(&format!("book_split_{}_", k + 1)),
            "unexpected name {name}"
        );

        let chunk = load(&output.path);
        assert_eq!(chunk.page_count(), output.pages);
        for n in 1..=chunk.page_count() {
            assert_eq!(chunk.page_content(n).unwrap(), fixture.content(page));
            page += 1;
        }
    }
    assert_eq!(page, 11);
    assert_eq!(ws.output_names().len(), 4);
}

#[rstest]
#[case(1, 5)]
#[case(4, 2)]
#[case(5, 1)]
#[case(50, 1)]
#[tokio::test]
async fn test_split_partition(#[case] pages_per_split: u32, #[case] expected_files: usize) {
    let ws = Workspace::new();
    let source = Fixture::new(5, "p").write(ws.input_dir(), "p.pdf");

    let outcome = pdfmate::split_by_count(
        &source,
        pages_per_split,
        ws.output_dir(),
        &OperationOptions::default(),
    )
    .await
    .unwrap();

    let sizes: Vec<u32> = outcome.outputs.iter().map(|o| o.pages).collect();
    assert_eq!(sizes.len(), expected_files);
    assert_eq!(sizes.iter().sum::<u32>(), 5);
    assert!(sizes.iter().all(|&size| size <= pages_per_split));
}

#[tokio::test]
async fn test_split_zero_is_argument_error() {
    let ws = Workspace::new();
    let source = Fixture::new(3, "z").write(ws.input_dir(), "z.pdf");

    let err = pdfmate::split_by_count(&source, 0, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Argument);
    assert!(ws.output_names().is_empty());
}

#[tokio::test]
async fn test_split_failure_removes_published_chunks() {
    let ws = Workspace::new();
    let source = Fixture::new(7, "r")
        .broken_page(5)
        .write(ws.input_dir(), "r.pdf");

    let err = pdfmate::split_by_count(&source, 2, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Encoding);
    assert!(ws.output_names().is_empty(), "left behind: {:?}", ws.output_names());
}

#[tokio::test]
async fn test_range_extracts_pages() {
    let ws = Workspace::new();
    let fixture = Fixture::new(8, "doc");
    let source = fixture.write(ws.input_dir(), "doc.pdf");

    let outcome = pdfmate::split_by_range(&source, 3, 5, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap();

    let output = &outcome.outputs[0];
    let name = output.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("doc_pages_3-5_"), "unexpected name {name}");

    let doc = load(&output.path);
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.page_content(1).unwrap(), fixture.content(3));
    assert_eq!(doc.page_content(3).unwrap(), fixture.content(5));
}

#[tokio::test]
async fn test_range_end_is_clamped() {
    let ws = Workspace::new();
    let source = Fixture::new(5, "c").write(ws.input_dir(), "c.pdf");

    let outcome = pdfmate::split_by_range(&source, 2, 99, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap();

    let output = &outcome.outputs[0];
    assert_eq!(output.pages, 4);
    let name = output.path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("c_pages_2-5_"), "unexpected name {name}");
}

#[rstest]
#[case::start_beyond_count(6, 8)]
#[case::start_zero(0, 3)]
#[case::end_before_start(4, 2)]
#[tokio::test]
async fn test_range_rejects_bad_bounds(#[case] start: u32, #[case] end: u32) {
    let ws = Workspace::new();
    let source = Fixture::new(5, "b").write(ws.input_dir(), "b.pdf");

    let err = pdfmate::split_by_range(&source, start, end, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Index);
    assert!(matches!(err, PdfMateError::InvalidPageRange { total_pages: 5, .. }));
    assert!(ws.output_names().is_empty());
}
