//! 📦 Common data structures: the postal workers of esgz.
//!
//! 🎬 INT. STDIN. A line arrives. It does not know it is about to become two lines.
//!
//! A raw log line gets its `id` plucked out ([`ParsedIdentifier`]), that id is
//! dressed up as a bulk header ([`BulkHeader`]), and the header plus the untouched
//! original line travel together as a [`LogDocument`]. Batches of those are what
//! the submitter ships. Nobody re-serializes the body. The body is sacred. 🦆

use serde::{Deserialize, Serialize};

/// 🔎 The only thing we need out of a log line: who it is.
///
/// Every other field in the line is ignored during parsing. It still ships,
/// verbatim, as the document body; we just don't read it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParsedIdentifier {
    pub id: String,
}

/// 🧾 The bulk directive that precedes each document body.
///
/// Only `_id` is set on the default path. The other slots are reserved by the
/// schema and skipped when empty, so the default header renders as `{"_id":"..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkHeader {
    #[serde(rename = "_index", skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "_timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl BulkHeader {
    /// 🏗️ A header that knows only the document id. The usual case.
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// 📄 One bulk unit: a serialized header and the original line as the body.
///
/// Both halves are independently valid JSON. Joined with newlines they form
/// exactly one unit of the bulk protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDocument {
    pub header: String,
    pub body: String,
}

impl LogDocument {
    /// 📏 Bytes this document adds to a bulk payload, newlines included.
    pub fn wire_len(&self) -> usize {
        self.header.len() + self.body.len() + 2
    }
}
