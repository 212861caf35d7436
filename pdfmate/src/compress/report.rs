//! Per-stream compression results.

use lopdf::ObjectId;
use serde::Serialize;

use crate::config::CompressionLevel;
use crate::error::ErrorReport;
use crate::model::XrefForm;

/// Why a stream was left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PassthroughReason {
    /// The filter chain contains a filter that cannot be decoded, typically
    /// an image codec.
    UnsupportedFilter {
        /// Name of the first unsupported filter.
        filter: String,
    },
    /// The stream could not be decoded through its chain.
    DecodeFailed {
        /// The codec error.
        error: ErrorReport,
    },
    /// Re-encoding would not make the stream smaller.
    NoGain,
    /// XMP metadata, kept readable.
    Metadata,
}

/// Outcome for one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StreamOutcome {
    /// Replaced by a single FlateDecode payload.
    Recoded {
        /// Encoded length before.
        before: usize,
        /// Encoded length after.
        after: usize,
    },
    /// Kept byte for byte.
    PassedThrough {
        /// Why.
        reason: PassthroughReason,
    },
}

/// One stream's entry in a [`CompressionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamReport {
    /// Object id in the compressed document.
    pub id: ObjectId,
    /// What happened to it.
    #[serde(flatten)]
    pub outcome: StreamOutcome,
}

/// Everything the compressor did to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionReport {
    /// Level the document was compressed at.
    pub level: CompressionLevel,
    /// Cross-reference form the output should be written with.
    pub xref_form: XrefForm,
    /// Objects dropped because nothing reachable from the trailer used them.
    pub pruned_objects: usize,
    /// Every stream that survived pruning, in object-id order.
    pub streams: Vec<StreamReport>,
}

impl CompressionReport {
    pub(crate) fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            xref_form: level.xref_form(),
            pruned_objects: 0,
            streams: Vec::new(),
        }
    }

    /// Number of streams that were re-encoded.
    pub fn recoded_count(&self) -> usize {
        self.streams
            .iter()
            .filter(|s| matches!(s.outcome, StreamOutcome::Recoded { .. }))
            .count()
    }

    /// Number of streams kept unchanged.
    pub fn passthrough_count(&self) -> usize {
        self.streams.len() - self.recoded_count()
    }

    /// Streams whose decoding failed.
    pub fn failures(&self) -> impl Iterator<Item = &StreamReport> {
        self.streams.iter().filter(|s| {
            matches!(
                s.outcome,
                StreamOutcome::PassedThrough {
                    reason: PassthroughReason::DecodeFailed { .. }
                }
            )
        })
    }

    /// Stream bytes saved by recoding.
    pub fn bytes_saved(&self) -> u64 {
        self.streams
            .iter()
            .map(|s| match s.outcome {
                StreamOutcome::Recoded { before, after } => before.saturating_sub(after) as u64,
                StreamOutcome::PassedThrough { .. } => 0,
            })
            .sum()
    }
}
