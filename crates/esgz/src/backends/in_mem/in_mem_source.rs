use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Deserialize;

use tracing::debug;

use crate::backends::Source;
use crate::error::PipelineError;

/// 📦 Lines to replay, straight from the config. Handy for dry runs.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct InMemorySourceConfig {
    #[serde(default)]
    pub lines: Vec<String>,
}

/// 📦 The world's most predictable data source.
///
/// Hands out its lines front to back, skipping empty ones (same rule as the
/// file source), then says `None` forever after.
#[derive(Debug, Default)]
pub(crate) struct InMemorySource {
    lines: VecDeque<String>,
    // 🔢 shared so a test can watch how far the reader got while the pipeline runs
    served: Arc<AtomicU64>,
}

impl InMemorySource {
    pub(crate) fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            served: Arc::default(),
        }
    }

    /// 🔢 Live count of lines handed out so far.
    #[cfg(test)]
    pub(crate) fn served(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.served)
    }
}

#[async_trait]
impl Source for InMemorySource {
    async fn next_line(&mut self) -> Result<Option<String>, PipelineError> {
        while let Some(line) = self.lines.pop_front() {
            if !line.is_empty() {
                self.served.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(line));
            }
        }
        debug!(
            "🏁 in-memory source exhausted after {} lines",
            self.served.load(Ordering::Relaxed)
        );
        Ok(None)
    }
}
