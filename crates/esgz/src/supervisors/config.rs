//! 🔧 PipelineConfig: the frozen, validated shape of one run.
//!
//! `AppConfig` is what the user wrote. `PipelineConfig` is what the supervisor
//! actually runs with: the index resolved into a full `_bulk` URL, every count
//! checked to be positive, nothing left to `Option`. It never changes after the
//! first worker starts.

use crate::app_config::{AppConfig, MalformedPolicy, SinkConfig};
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// 📡 `<backend-base>/<index-name>/_bulk`
    pub target_url: String,
    pub batch_size: usize,
    pub worker_count: usize,
    pub document_queue_capacity: usize,
    pub line_queue_capacity: usize,
    pub report_final_flush: bool,
    pub malformed_policy: MalformedPolicy,
}

impl PipelineConfig {
    /// 🏗️ Resolve the app config into a runnable one.
    ///
    /// `index_override` (usually the CLI positional) beats the index in the sink config.
    pub fn from_app_config(
        app_config: &AppConfig,
        index_override: Option<&str>,
    ) -> Result<Self, PipelineError> {
        let target_url = match &app_config.sink_config {
            SinkConfig::Elasticsearch(es) => {
                let index = index_override
                    .or(es.index.as_deref())
                    .map(str::trim)
                    .filter(|index| !index.is_empty())
                    .ok_or_else(|| {
                        PipelineError::InvalidConfig(
                            "no index name: pass one on the command line or set sink_config.Elasticsearch.index"
                                .to_string(),
                        )
                    })?;
                bulk_url(&es.url, index)
            }
            SinkConfig::InMemory => bulk_url("memory://esgz", index_override.unwrap_or("in-memory")),
        };

        let runtime = &app_config.runtime;
        let config = Self {
            target_url,
            batch_size: runtime.batch_size,
            worker_count: runtime.worker_count,
            document_queue_capacity: runtime.document_queue_capacity,
            line_queue_capacity: runtime.line_queue_capacity,
            report_final_flush: runtime.report_final_flush,
            malformed_policy: runtime.malformed_policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// ⚠️ Zero of anything means a pipeline that can never move. Refuse it up front.
    pub(crate) fn validate(&self) -> Result<(), PipelineError> {
        for (name, value) in [
            ("batch_size", self.batch_size),
            ("worker_count", self.worker_count),
            ("document_queue_capacity", self.document_queue_capacity),
            ("line_queue_capacity", self.line_queue_capacity),
        ] {
            if value == 0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

fn bulk_url(base: &str, index: &str) -> String {
    format!("{}/{}/_bulk", base.trim_end_matches('/'), index)
}
