use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::backends::Sink;
use crate::error::PipelineError;

// -- 🏠 loopback on 8080: where the reference deployment kept its cluster (or its proxy)
fn default_url() -> String {
    "http://localhost:8080".to_string()
}

/// 🚰 Where the bulk requests go.
///
/// The full target is `<url>/<index>/_bulk`. `index` can live here or come
/// from the command line; the command line wins.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ElasticsearchSinkConfig {
    /// 📡 Base URL of the backend. Scheme + host + port. Trailing slash optional.
    #[serde(default = "default_url")]
    pub url: String,
    /// 📦 Target index. Optional here because the CLI usually brings it.
    #[serde(default)]
    pub index: Option<String>,
}

impl Default for ElasticsearchSinkConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index: None,
        }
    }
}

/// 📡 The HTTP end of the pipeline: POST the payload, drop the answer.
///
/// Holds a pooled `reqwest::Client`, so cloning one of these per batch worker
/// shares connections instead of opening a new pool per worker.
#[derive(Debug, Clone)]
pub(crate) struct ElasticsearchSink {
    client: reqwest::Client,
    bulk_url: String,
}

impl ElasticsearchSink {
    /// 🚀 Build the client for an already resolved `.../<index>/_bulk` URL.
    ///
    /// Only the connect phase gets a timeout. Once a bulk request is in flight,
    /// we wait for it, however long that takes.
    pub(crate) fn new(bulk_url: impl Into<String>) -> Result<Self, PipelineError> {
        let bulk_url = bulk_url.into();
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|source| PipelineError::Transport {
                url: bulk_url.clone(),
                source,
            })?;
        Ok(Self { client, bulk_url })
    }

    pub(crate) fn bulk_url(&self) -> &str {
        &self.bulk_url
    }
}

#[async_trait]
impl Sink for ElasticsearchSink {
    /// 📡 One payload, one POST. The response body is read and thrown away.
    ///
    /// A response that isn't 2xx still counts as "received": we log it and move
    /// on. Only a request that never completes is fatal.
    async fn send(&mut self, payload: String) -> Result<(), PipelineError> {
        let payload_len = payload.len();
        trace!("📡 POST {} bytes to {}", payload_len, self.bulk_url);

        let response = self
            .client
            .post(&self.bulk_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|source| PipelineError::Transport {
                url: self.bulk_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "⚠️ bulk request of {} bytes answered with {}; body not inspected",
                payload_len, status
            );
        }

        // 🗑️ drain so the connection goes back to the pool. contents: not our business.
        if let Err(err) = response.bytes().await {
            debug!("🗑️ could not drain bulk response body: {}", err);
        }
        Ok(())
    }

    /// 🗑️ Nothing buffered, nothing to flush. The pool drops with the client.
    async fn close(&mut self) -> Result<(), PipelineError> {
        debug!("🗑️ elasticsearch sink closing, no buffer to flush");
        Ok(())
    }
}
