//! Stream recompression.
//!
//! The [`Compressor`] prunes objects that nothing reachable from the trailer
//! uses, then pushes every remaining stream through its filter chain and
//! re-encodes it as a single FlateDecode payload when that makes it smaller.
//! Streams that cannot or should not be touched are reported, never fatal.

pub mod report;

pub use report::{CompressionReport, PassthroughReason, StreamOutcome, StreamReport};

use lopdf::{Document, Object, ObjectId, Stream};

use crate::config::CompressionLevel;
use crate::error::{ErrorReport, Result};
use crate::model::{PdfDocument, filters, graph};

/// Recompresses the streams of a document at a fixed level.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compressor {
    level: CompressionLevel,
}

impl Compressor {
    /// Create a compressor for `level`.
    pub fn new(level: CompressionLevel) -> Self {
        Self { level }
    }

    /// The level this compressor encodes at.
    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Compress `document` in place and report what happened to each stream.
    ///
    /// Per-stream failures end up in the report as
    /// [`PassthroughReason::DecodeFailed`]; this only fails if the document
    /// itself cannot be modified.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pdfmate::compress::Compressor;
    /// use pdfmate::config::CompressionLevel;
    /// use pdfmate::model::PdfDocument;
    ///
    /// # fn example(doc: PdfDocument) -> pdfmate::Result<()> {
    /// let (doc, report) = Compressor::new(CompressionLevel::High).compress(doc)?;
    /// println!("{} streams recoded, {} bytes saved", report.recoded_count(), report.bytes_saved());
    /// # let _ = doc;
    /// # Ok(())
    /// # }
    /// ```
    pub fn compress(&self, mut document: PdfDocument) -> Result<(PdfDocument, CompressionReport)> {
        let mut report = CompressionReport::new(self.level);
        report.pruned_objects = prune_unreachable(document.inner_mut());

        let stream_ids: Vec<ObjectId> = document
            .inner()
            .objects
            .iter()
            .filter_map(|(&id, object)| matches!(object, Object::Stream(_)).then_some(id))
            .collect();

        for id in stream_ids {
            let (outcome, recoded) = match document.inner().get_object(id)? {
                Object::Stream(stream) => self.recode(document.inner(), id, stream),
                _ => continue,
            };

            if let Some(content) = recoded
                && let Object::Stream(stream) = document.inner_mut().get_object_mut(id)?
            {
                stream.dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
                stream.dict.remove(b"DecodeParms");
                stream.dict.remove(b"DL");
                stream.set_content(content);
            }

            tracing::debug!(id = ?id, outcome = ?outcome, "Processed stream");
            report.streams.push(StreamReport { id, outcome });
        }

        tracing::debug!(
            level = self.level.as_str(),
            recoded = report.recoded_count(),
            passed_through = report.passthrough_count(),
            pruned = report.pruned_objects,
            saved = report.bytes_saved(),
            "Compressed document"
        );

        Ok((document, report))
    }

    /// Decide the outcome for one stream; the new payload if it is recoded.
    fn recode(
        &self,
        doc: &Document,
        id: ObjectId,
        stream: &Stream,
    ) -> (StreamOutcome, Option<Vec<u8>>) {
        let passed = |reason| (StreamOutcome::PassedThrough { reason }, None);

        if is_xmp_metadata(stream) {
            return passed(PassthroughReason::Metadata);
        }

        let chain = match filters::filter_chain(doc, &stream.dict) {
            Ok(chain) => chain,
            Err(err) => return passed(decode_failed(id, err)),
        };
        if let Some(step) = chain.iter().find(|step| !step.filter.is_supported()) {
            return passed(PassthroughReason::UnsupportedFilter {
                filter: step.filter.name().to_string(),
            });
        }

        let encoded = filters::decode_stream(doc, stream)
            .and_then(|decoded| filters::encode_flate(&decoded, self.level.flate_level()));
        let encoded = match encoded {
            Ok(encoded) => encoded,
            Err(err) => return passed(decode_failed(id, err)),
        };

        let before = stream.content.len();
        if encoded.len() >= before {
            return passed(PassthroughReason::NoGain);
        }

        (
            StreamOutcome::Recoded {
                before,
                after: encoded.len(),
            },
            Some(encoded),
        )
    }
}

fn decode_failed(id: ObjectId, err: crate::PdfMateError) -> PassthroughReason {
    let err = err.for_object(id);
    tracing::warn!(id = ?id, error = %err, "Stream left unchanged");
    PassthroughReason::DecodeFailed {
        error: ErrorReport::from(&err),
    }
}

fn is_xmp_metadata(stream: &Stream) -> bool {
    stream
        .dict
        .get(b"Type")
        .and_then(Object::as_name)
        .is_ok_and(|name| name == b"Metadata")
}

/// Drop every object not reachable from the trailer. Returns how many went.
fn prune_unreachable(doc: &mut Document) -> usize {
    let roots = graph::references(&Object::Dictionary(doc.trailer.clone()));
    let live = graph::reachable(&doc.objects, roots).reachable;

    let before = doc.objects.len();
    doc.objects.retain(|id, _| live.contains(id));
    before - doc.objects.len()
}
