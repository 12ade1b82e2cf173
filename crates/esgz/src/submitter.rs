//! 📮 The Submitter: one batch in, one request out.
//!
//! Each batch worker owns one of these. It composes the batch into an NDJSON
//! payload and hands it to the sink, and it blocks that worker until the sink
//! says the request completed. No retry. No backoff. No circuit breaker. If the
//! sink can't deliver, the error goes straight back up to the supervisor.

use tracing::trace;

use crate::backends::{Sink, SinkBackend};
use crate::common::LogDocument;
use crate::composers::NdjsonComposer;
use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub(crate) struct Submitter {
    sink: SinkBackend,
    composer: NdjsonComposer,
}

impl Submitter {
    pub(crate) fn new(sink: SinkBackend) -> Self {
        Self {
            sink,
            composer: NdjsonComposer,
        }
    }

    /// 📡 Compose and send one batch. An empty batch sends nothing.
    pub(crate) async fn submit(&mut self, batch: &[LogDocument]) -> Result<(), PipelineError> {
        if batch.is_empty() {
            return Ok(());
        }
        let payload = self.composer.compose(batch);
        trace!("📮 submitting {} docs in {} bytes", batch.len(), payload.len());
        self.sink.send(payload).await
    }

    /// 🗑️ Release the sink once the owning worker is done.
    pub(crate) async fn close(&mut self) -> Result<(), PipelineError> {
        self.sink.close().await
    }
}
