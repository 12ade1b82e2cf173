//! 🔌 Backends: where the real I/O happens.
//!
//! 🚰 Sources pour lines in, sinks swallow bulk payloads out, and in between
//! the workers do the thinking. Backends do not think. Backends do I/O.
//!
//! Pattern, same on both ends: trait → concrete impls → backend enum that
//! dispatches with a `match`. The supervisor only ever sees the enums.
//!
//! 🦆 The duck is here because every file must have one. This is law.

use async_trait::async_trait;
use tracing::debug;

use crate::app_config::{SinkConfig, SourceConfig};
use crate::error::PipelineError;

pub(crate) mod elasticsearch;
pub(crate) mod file;
pub(crate) mod in_mem;

pub use elasticsearch::ElasticsearchSinkConfig;
pub use file::FileSourceConfig;
pub use in_mem::InMemorySourceConfig;

// ===== Source Trait and Backend Enum =====

/// 🚰 A source of raw input lines, one record per call.
///
/// # Contract 📜
/// - `Ok(Some(line))` while records flow; never an empty line, never a trailing newline
/// - `Ok(None)` once the input is exhausted. EOF. Fin. 🏁
/// - `Err(..)` when the read itself broke
#[async_trait]
pub(crate) trait Source: std::fmt::Debug {
    async fn next_line(&mut self) -> Result<Option<String>, PipelineError>;
}

/// 🎭 The many faces of a Source. Callers never need to know if it's a pipe or a Vec.
#[derive(Debug)]
pub(crate) enum SourceBackend {
    File(file::FileSource),
    InMemory(in_mem::InMemorySource),
}

impl SourceBackend {
    /// 🏗️ Open whatever the config points at. Only a file can fail here.
    pub(crate) async fn from_config(config: &SourceConfig) -> Result<Self, PipelineError> {
        Ok(match config {
            SourceConfig::Stdin => SourceBackend::File(file::FileSource::stdin()),
            SourceConfig::File(file_config) => {
                SourceBackend::File(file::FileSource::open(file_config).await?)
            }
            SourceConfig::InMemory(mem) => {
                SourceBackend::InMemory(in_mem::InMemorySource::new(mem.lines.iter().cloned()))
            }
        })
    }
}

#[async_trait]
impl Source for SourceBackend {
    async fn next_line(&mut self) -> Result<Option<String>, PipelineError> {
        match self {
            SourceBackend::File(f) => f.next_line().await,
            SourceBackend::InMemory(i) => i.next_line().await,
        }
    }
}

// ===== Sink Trait and Backend Enum =====

/// 🕳️ A sink that ships fully rendered bulk payloads. Pure I/O, zero logic.
///
/// # Contract 📜
/// - `send` delivers one payload as one request (or one write). No buffering.
/// - `close` releases whatever the sink holds. Call it once the worker is done.
/// - Composing the payload is the submitter's job, not the sink's.
#[async_trait]
pub(crate) trait Sink: std::fmt::Debug {
    async fn send(&mut self, payload: String) -> Result<(), PipelineError>;
    async fn close(&mut self) -> Result<(), PipelineError>;
}

/// 🎭 The many faces of a Sink.
///
/// `Clone` because every batch worker owns its own handle. For Elasticsearch
/// that's a cheap clone of a pooled `reqwest::Client`; for in-memory it's an `Arc`.
#[derive(Debug, Clone)]
pub(crate) enum SinkBackend {
    Elasticsearch(elasticsearch::ElasticsearchSink),
    InMemory(in_mem::InMemorySink),
}

impl SinkBackend {
    /// 🏗️ Build the sink for an already resolved bulk URL.
    pub(crate) fn from_config(config: &SinkConfig, target_url: &str) -> Result<Self, PipelineError> {
        match config {
            SinkConfig::Elasticsearch(_) => {
                let sink = elasticsearch::ElasticsearchSink::new(target_url)?;
                debug!("📡 elasticsearch sink ready for {}", sink.bulk_url());
                Ok(SinkBackend::Elasticsearch(sink))
            }
            SinkConfig::InMemory => Ok(SinkBackend::InMemory(in_mem::InMemorySink::new())),
        }
    }
}

#[async_trait]
impl Sink for SinkBackend {
    async fn send(&mut self, payload: String) -> Result<(), PipelineError> {
        match self {
            SinkBackend::Elasticsearch(sink) => sink.send(payload).await,
            SinkBackend::InMemory(sink) => sink.send(payload).await,
        }
    }

    async fn close(&mut self) -> Result<(), PipelineError> {
        match self {
            SinkBackend::Elasticsearch(sink) => sink.close().await,
            SinkBackend::InMemory(sink) => sink.close().await,
        }
    }
}
