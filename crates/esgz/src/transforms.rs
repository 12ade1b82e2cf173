//! 🔄 Transforms: raw line in, bulk-ready [`LogDocument`] out.
//!
//! 🎬 COLD OPEN: a log line walks into a bar. The bartender asks for ID.
//! The line produces a JSON object with an `"id"` field. It gets a header.
//! It goes to the bulk API. Everyone lives happily ever after, or the
//! process exits with status 1. There is no third ending.
//!
//! Transforms are zero-sized marker types. No vtables, no state, no I/O. The
//! parse workers call them in a tight loop, so they stay pure and boring.

use crate::common::LogDocument;
use crate::error::PipelineError;

pub mod bulk_envelope;

pub use bulk_envelope::{BulkEnvelope, build_envelope, parse_identifier};

/// 📥 IngestTransform: turns one raw input line into one document.
///
/// # Contract 📜
/// - Input: an owned `String`, so the body can move into the document without a copy
/// - Output: a [`LogDocument`] whose header and body are each valid JSON
/// - Same input, same output, byte for byte. Every time.
pub trait IngestTransform {
    fn transform_line(raw: String) -> Result<LogDocument, PipelineError>;
}

/// 🚀 Convenience for callers that only want the default envelope.
pub fn envelope_from_line(raw: String) -> Result<LogDocument, PipelineError> {
    BulkEnvelope::transform_line(raw)
}
