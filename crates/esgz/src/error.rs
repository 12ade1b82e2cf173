//! 💀 The taxonomy of things that go wrong at 3am.
//!
//! Workers never decide whether the world ends. They hand one of these back up
//! to the supervisor, and the supervisor (who has the policy, and the coffee)
//! decides between "abort everything" and "shrug, dead-letter it, keep going".
//!
//! 🦆 The duck has seen every variant in this file. It is not impressed by any of them.

use thiserror::Error;

/// 🏷️ Everything the pipeline knows how to fail at, by name.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 📄 A line came in that is not a JSON object with a string `id`.
    /// The offending line rides along in the message, so the diagnostic dump
    /// lands right before the process exits.
    #[error("💀 malformed input line, expected a JSON object with a string \"id\": {line}")]
    MalformedInput {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// 🧾 The bulk header refused to become JSON. Practically impossible. Practically.
    #[error("💀 failed to serialize the bulk header")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// 📡 The POST never completed. No retry, no backoff. Just this.
    #[error("💀 bulk request to '{url}' never completed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 🚰 The line source itself broke mid-read.
    #[error("💀 failed to read the next input line")]
    Input {
        #[source]
        source: std::io::Error,
    },

    /// 🔧 The config asked for something we can't build, like zero workers.
    #[error("💀 invalid pipeline config: {0}")]
    InvalidConfig(String),

    /// 🧵 A worker task died without returning a report.
    #[error("💀 a pipeline worker panicked or was cancelled")]
    WorkerPanicked(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// 🗑️ True for the one failure the dead-letter policy is allowed to swallow.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, PipelineError::MalformedInput { .. })
    }
}
