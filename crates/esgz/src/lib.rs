//! 🦆 esgz: pipe NDJSON log lines in, get Elasticsearch bulk requests out.
//!
//! ```text
//! cat app.log | esgz my-index
//! ```
//!
//! Each line must be a JSON object with a string `id`. That id becomes the
//! document id, the line itself becomes the document body untouched, and the
//! documents go out in fixed-size `_bulk` batches from a small pool of workers.
//! Progress prints once a second; a summary prints at the end.

pub mod app_config;
pub mod common;
pub mod composers;
pub mod error;
pub mod transforms;

mod backends;
mod progress;
mod submitter;
mod supervisors;

use anyhow::{Context, Result};
use tracing::info;

use crate::app_config::AppConfig;
use crate::backends::{SinkBackend, SourceBackend};
use crate::supervisors::Supervisor;

pub use crate::progress::RateSummary;
pub use crate::supervisors::RunSummary;
pub use crate::supervisors::config::PipelineConfig;

/// 🚀 Run one ingest end to end, printing progress to stdout.
///
/// `index` is the target index name; when `None` the index from the sink config is used.
pub async fn run(app_config: AppConfig, index: Option<&str>) -> Result<RunSummary> {
    let pipeline_config = PipelineConfig::from_app_config(&app_config, index)
        .context("💀 Could not turn the configuration into a runnable pipeline")?;

    let source = SourceBackend::from_config(&app_config.source_config)
        .await
        .context("💀 Could not open the input source")?;
    let sink = SinkBackend::from_config(&app_config.sink_config, &pipeline_config.target_url)
        .context("💀 Could not build the bulk sink")?;

    let summary = Supervisor::new(pipeline_config)
        .run(source, sink, Box::new(std::io::stdout()))
        .await
        .context("💀 The ingest pipeline failed")?;

    info!(
        "✅ {} lines read, {} documents in {} batches, {} dead-lettered",
        summary.lines_read, summary.documents_submitted, summary.batches_submitted, summary.dead_lettered
    );
    Ok(summary)
}
