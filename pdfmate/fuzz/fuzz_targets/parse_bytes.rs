#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfmate::model::{PdfDocument, SerializeOptions};

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary bytes must return an error, never panic.
    let Ok(document) = PdfDocument::parse(data) else {
        return;
    };

    let pages = document.page_count();
    if let Ok(bytes) = document.serialize(&SerializeOptions::default()) {
        let reparsed = PdfDocument::parse(&bytes).expect("serialized output must parse");
        assert_eq!(reparsed.page_count(), pages);
    }
});
