//! 🎼 Composers: a batch of documents in, one bulk payload out.
//!
//! *[the batch is full. the composer hums. newlines fall like rain.]*
//!
//! The wire format is NDJSON, two lines per document:
//! ```text
//! {"_id":"a"}
//! {"id":"a","msg":"..."}
//! {"_id":"b"}
//! {"id":"b","msg":"..."}
//! ```
//! Trailing newline included. The bulk API cares about that newline more than
//! it cares about your weekend. 🦆

use crate::common::LogDocument;

/// 📡 Newline-Delimited JSON, the only framing the bulk endpoint respects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NdjsonComposer;

impl NdjsonComposer {
    /// 🎼 Render `header\nbody\n` for every document, in batch order.
    pub fn compose(&self, batch: &[LogDocument]) -> String {
        // 🧮 exact capacity, since we know every byte that is about to show up
        let mut payload = String::with_capacity(batch.iter().map(LogDocument::wire_len).sum());
        for doc in batch {
            payload.push_str(&doc.header);
            payload.push('\n');
            payload.push_str(&doc.body);
            payload.push('\n');
        }
        payload
    }
}
