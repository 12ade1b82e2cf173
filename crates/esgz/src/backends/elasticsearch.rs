//! # 📡 THE ELASTICSEARCH BACKEND
//!
//! 🎬 COLD OPEN: INT. SERVER ROOM, 3:47 AM
//!
//! The dashboard glows amber. Somewhere, a `_bulk` endpoint waits for the
//! next batch. It does not know how many are coming. Neither do we. That's
//! what stdin is for.
//!
//! This backend is the sink side only: one POST per batch, `application/json`,
//! body discarded on arrival. No retries, no auth, no TLS opinions. If the
//! request can't complete, the pipeline ends. Fail fast, cry later.
//!
//! 🦆 (mandatory duck, no context provided, none shall be requested)

mod elasticsearch_sink;

pub(crate) use elasticsearch_sink::ElasticsearchSink;
pub use elasticsearch_sink::ElasticsearchSinkConfig;
