//! 🧾 Record parser + envelope builder.
//!
//! Two tiny steps:
//! 1. [`parse_identifier`] reads just enough of the line to find its `id`
//! 2. [`build_envelope`] serializes the header and pairs it with the untouched line
//!
//! ## Knowledge Graph 🧠
//! - Used by: the parse workers, once per line
//! - Header: `{"_id":"<id>"}` (reserved fields skipped, see [`BulkHeader`])
//! - Body: the original line, verbatim, never re-serialized

use super::IngestTransform;
use crate::common::{BulkHeader, LogDocument, ParsedIdentifier};
use crate::error::PipelineError;

/// 📡 The default transform: id-only header + verbatim body.
#[derive(Debug, Clone, Copy)]
pub struct BulkEnvelope;

impl IngestTransform for BulkEnvelope {
    fn transform_line(raw: String) -> Result<LogDocument, PipelineError> {
        let parsed = parse_identifier(&raw)?;
        build_envelope(&parsed, raw)
    }
}

/// 🔎 Pull the `id` out of a raw line.
///
/// The line must be a JSON object with a string `"id"`; everything else in it
/// is ignored. Anything else (not JSON, not an object, missing or non-string
/// id) is a [`PipelineError::MalformedInput`] carrying the line for the autopsy.
pub fn parse_identifier(line: &str) -> Result<ParsedIdentifier, PipelineError> {
    serde_json::from_str::<ParsedIdentifier>(line).map_err(|source| PipelineError::MalformedInput {
        line: line.to_string(),
        source,
    })
}

/// 🏗️ Wrap the original line in its bulk header.
pub fn build_envelope(parsed: &ParsedIdentifier, raw: String) -> Result<LogDocument, PipelineError> {
    let header = serde_json::to_string(&BulkHeader::for_id(parsed.id.as_str()))
        .map_err(|source| PipelineError::Serialization { source })?;
    Ok(LogDocument { header, body: raw })
}
