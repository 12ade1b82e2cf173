//! 🔧 App Configuration: the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." (every developer at 3am) 🦆
//!
//! 🏗️ Powered by Figment. `ESGZ_*` env vars are the base layer, an optional TOML
//! file sits on top, and every field has a default so an empty environment still
//! produces something runnable: stdin in, `http://localhost:8080` out.

use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use tracing::info;

pub use crate::backends::{ElasticsearchSinkConfig, FileSourceConfig, InMemorySourceConfig};

/// 📦 One struct to rule them all.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// 🚰 Where lines come from. Stdin unless told otherwise.
    #[serde(default)]
    pub source_config: SourceConfig,
    /// 🕳️ Where bulk payloads go.
    #[serde(default)]
    pub sink_config: SinkConfig,
    /// 🧵 Worker counts, batch size, queue capacities, policies.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// 🚰 Which source backend to build.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub enum SourceConfig {
    #[default]
    Stdin,
    File(FileSourceConfig),
    InMemory(InMemorySourceConfig),
}

/// 🕳️ Which sink backend to build.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Elasticsearch(ElasticsearchSinkConfig),
    /// 📦 Collect payloads in memory. For dry runs and tests, not for prod.
    InMemory,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig::Elasticsearch(ElasticsearchSinkConfig::default())
    }
}

/// 🗑️ What a parse worker does with a line it can't read.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// 💀 End the whole run. The reference behavior.
    #[default]
    Abort,
    /// 📮 Log the line, count it, keep going.
    DeadLetter,
}

/// 🧵 The knobs the supervisor turns before any worker starts.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// 📦 Documents per bulk request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// 🧵 Parse workers AND batch workers. Same number for both pools.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// 🚧 Capacity of the parsed-document queue. The backpressure valve. Keep it small.
    #[serde(default = "default_document_queue_capacity")]
    pub document_queue_capacity: usize,
    /// 🚧 Capacity of the raw-line queue. 1 is as close to a hand-to-hand pass as a bounded queue gets.
    #[serde(default = "default_line_queue_capacity")]
    pub line_queue_capacity: usize,
    /// 📊 Also count the final partial flush of each batch worker in the live rate.
    /// Off by default, so partial flushes are sent but not reported.
    #[serde(default)]
    pub report_final_flush: bool,
    #[serde(default)]
    pub malformed_policy: MalformedPolicy,
}

fn default_batch_size() -> usize {
    2
}

fn default_worker_count() -> usize {
    2
}

fn default_document_queue_capacity() -> usize {
    3
}

fn default_line_queue_capacity() -> usize {
    1
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            worker_count: default_worker_count(),
            document_queue_capacity: default_document_queue_capacity(),
            line_queue_capacity: default_line_queue_capacity(),
            report_final_flush: false,
            malformed_policy: MalformedPolicy::default(),
        }
    }
}

/// 🚀 Load the config from `ESGZ_*` env vars and, if given, a TOML file.
///
/// 📐 Nested keys use a double underscore: `ESGZ_RUNTIME__BATCH_SIZE=500`.
/// When both are present the TOML file wins.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("ESGZ_").split("__"));

    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (ESGZ_*). \
             Check the TOML, then check the env, then check the TOML again.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (ESGZ_*). \
                 No file was provided, so this one's all on the environment."
            .to_string(),
    };

    config.extract().context(context_msg)
}
