//! 🚀 esgz-cli: the front door, the bouncer, the maitre d' of esgz.
//!
//! 🎬 *[narrator voice]* "It all started with `cat app.log | esgz my-index`..."
//! 📦 Thin wrapper: parse args, set up logging, load config, then let the
//! library do the heavy lifting. Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// 📡 Bulk-index NDJSON log lines from stdin into Elasticsearch.
#[derive(Debug, Parser)]
#[command(name = "esgz", version, about)]
struct Cli {
    /// 🎯 Target index name. Overrides `sink_config.Elasticsearch.index` from the config.
    index: Option<String>,

    /// 🔧 Optional TOML config file. `ESGZ_*` env vars are read either way.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// 🚀 main(): the "I pressed enter and held my breath" moment.
///
/// 🔧 Steps:
/// 1. Init tracing, on stderr, so stdout stays progress lines only
/// 2. Parse args
/// 3. Load config (the moment of truth)
/// 4. Run the thing (send it and pray 🙏)
/// 5. Handle errors (cry, then exit 1)
#[tokio::main]
async fn main() -> Result<()> {
    // 📡 stderr, always. stdout belongs to the progress lines.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 🔒 Validate the config file exists before we get too emotionally attached
    if let Some(path) = cli.config.as_deref() {
        let exists = path.try_exists().with_context(|| {
            format!(
                "💀 Couldn't check whether the configuration file exists. \
                 If it's a relative path, try an absolute one. Was checking here: '{}'",
                path.display()
            )
        })?;
        if !exists {
            anyhow::bail!(
                "💀 Configuration file not found: '{}'. We looked everywhere. Under the couch. Behind the fridge.",
                path.display()
            );
        }
    }

    let app_config = esgz::app_config::load_config(cli.config.as_deref()).context(
        "💀 In esgz-cli, main, we couldn't load the configuration. Check the file, check the ESGZ_* env vars.",
    )?;

    // 🚀 SEND IT. No take-backs. This is not a drill.
    let result = esgz::run(app_config, cli.index.as_deref()).await;

    if let Err(err) = result {
        error!("💀 error: {}", err);
        // -- 🧅 peel the onion of sadness, one layer at a time
        let mut the_vibes_are_giving_connection_issues = false;
        for cause in err.chain().skip(1) {
            error!("⚠️  cause: {}", cause);
            let cause_str = cause.to_string();
            if cause_str.contains("error sending request")
                || cause_str.contains("connection refused")
                || cause_str.contains("Connection refused")
                || cause_str.contains("tcp connect error")
                || cause_str.contains("dns error")
                || cause_str.contains("never completed")
            {
                the_vibes_are_giving_connection_issues = true;
            }
        }

        if the_vibes_are_giving_connection_issues {
            error!(
                "🔧 hint: looks like Elasticsearch isn't reachable. \
                Double-check the url in sink_config (default http://localhost:8080) \
                and that the cluster is actually running. If you're using Docker, try \
                `docker ps` to see what's up. Even servers need a nudge sometimes. ☕"
            );
        }

        // 🗑️ Exit with prejudice. Any fatal error is status 1.
        std::process::exit(1);
    }

    Ok(())
}
