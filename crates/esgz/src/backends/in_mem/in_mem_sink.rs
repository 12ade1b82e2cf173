use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};
use tracing::debug;

use crate::backends::Sink;
use crate::error::PipelineError;

/// 📦 A sink that never forgets.
///
/// Every payload lands in a shared `Vec`, one entry per would-be HTTP request.
/// Clone-able because each batch worker gets its own handle, and the test gets
/// one more to peek with once the pipeline is done. The `Arc` means everyone
/// shares the same `Vec`. Communist data, but in a good way.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemorySink {
    received: Arc<Mutex<Vec<String>>>,
    // 🚦 when set, every send waits for one permit. lets a test play "slow cluster".
    gate: Option<Arc<Semaphore>>,
}

impl InMemorySink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 🚦 A sink that accepts one payload per permit added to `gate`.
    #[cfg(test)]
    pub(crate) fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// 📋 Snapshot of every payload received so far, in arrival order.
    #[cfg(test)]
    pub(crate) async fn payloads(&self) -> Vec<String> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl Sink for InMemorySink {
    /// 📡 Lock, push, done. Like a fax machine but for bytes. 🦆
    async fn send(&mut self, payload: String) -> Result<(), PipelineError> {
        if let Some(gate) = &self.gate {
            // -- a closed gate lets everything through
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.received.lock().await.push(payload);
        Ok(())
    }

    /// 🗑️ Nothing to clean up. We live in RAM.
    async fn close(&mut self) -> Result<(), PipelineError> {
        debug!("📦 in-memory sink holds {} payloads", self.received.lock().await.len());
        Ok(())
    }
}
