//! Error classification at the operation boundary.

use lopdf::dictionary;
use pdfmate::config::OperationOptions;
use pdfmate::{CompressionLevel, ErrorKind, ErrorReport, PdfMateError};

use crate::common::{Fixture, Workspace};

#[tokio::test]
async fn test_error_nonexistent_input() {
    let ws = Workspace::new();
    let missing = ws.input_dir().join("nope.pdf");

    let err = pdfmate::compress(
        &missing,
        CompressionLevel::Normal,
        ws.output_dir(),
        &OperationOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PdfMateError::FileNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_not_a_pdf() {
    let ws = Workspace::new();
    let path = ws.input_dir().join("notes.pdf");
    std::fs::write(&path, b"just some text, no header at all").unwrap();

    let err = pdfmate::split_by_count(&path, 1, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("notes.pdf"));
}

#[tokio::test]
async fn test_error_truncated_pdf() {
    let ws = Workspace::new();
    let bytes = Fixture::new(3, "t").to_bytes();
    let path = ws.input_dir().join("truncated.pdf");
    std::fs::write(&path, &bytes[..bytes.len() / 3]).unwrap();

    let err = pdfmate::inspect(&path).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_error_encrypted_pdf() {
    let ws = Workspace::new();
    let mut doc = Fixture::new(1, "e").build();
    let encrypt = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
    });
    doc.trailer.set("Encrypt", encrypt);
    let path = ws.input_dir().join("locked.pdf");
    doc.save(&path).unwrap();

    let err = pdfmate::inspect(&path).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[tokio::test]
async fn test_error_missing_output_dir() {
    let ws = Workspace::new();
    let source = Fixture::new(1, "o").write(ws.input_dir(), "o.pdf");
    let missing_dir = ws.output_dir().join("missing");

    let err = pdfmate::compress(
        &source,
        CompressionLevel::Low,
        &missing_dir,
        &OperationOptions::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Argument);
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_error_report_serializes_kind_and_message() {
    let ws = Workspace::new();
    let source = Fixture::new(2, "r").write(ws.input_dir(), "r.pdf");

    let err = pdfmate::split_by_range(&source, 3, 4, ws.output_dir(), &OperationOptions::default())
        .await
        .unwrap_err();
    let json = serde_json::to_value(ErrorReport::from(&err)).unwrap();

    assert_eq!(json["kind"], "index");
    assert!(json["message"].as_str().unwrap().contains("3-4"));
    assert_eq!(err.exit_code(), 4);
}
