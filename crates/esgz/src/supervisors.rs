//! 🎬 *[camera pans across a dimly lit server room]*
//! 🎬 *[a pipe opens. a million log lines wait politely to be bulk-indexed.]*
//! 🎬 "In a world where workers toil endlessly..."
//! 🎬 "One supervisor dared to wire them all together."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The Supervisor: the only thing that knows the whole shape of a run.
//!
//! ```text
//!  source ──▶ [lines, cap L] ──▶ ParseWorker × W ──▶ [documents, cap 3] ──▶ BatchWorker × W ──▶ sink
//!                                                                                  │
//!                                                                    RateAggregator ◀┘ (samples)
//! ```
//!
//! Shutdown runs front to back: the source hits EOF, the line queue closes, the
//! parse workers drain it and exit, the document queue closes, the batch workers
//! drain it, flush what they hold and exit, and only then is the aggregator told
//! to stop. Any fatal error short-circuits that: the failing worker closes its
//! queue and trips a shared [`FailureSignal`], the reader stops even if the
//! input is an idle pipe, and the run ends with an `Err`.
//!
//! ⚠️ DO NOT MAKE THE WORKERS PUB EVER
//! 🔒 Like Fight Club, but for async tasks. First rule: you don't pub the workers.

mod workers;
// 🔧 but of course you can tell the supervisor how to manage their minions
pub mod config;

use std::io::Write;

use async_channel::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::backends::{SinkBackend, Source, SourceBackend};
use crate::error::PipelineError;
use crate::progress::{RateAggregator, RateSummary};
use crate::submitter::Submitter;
use config::PipelineConfig;
use workers::{BatchReport, BatchWorker, FailureSignal, ParseReport, ParseWorker, Worker};

/// 🧾 Everything a finished run knows about itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// 📡 Where the bulk requests went.
    pub target_url: String,
    /// 📄 Non-empty lines handed to the parse workers.
    pub lines_read: u64,
    pub documents_parsed: u64,
    /// 📮 Lines skipped under the dead-letter policy. Always 0 under abort.
    pub dead_lettered: u64,
    pub batches_submitted: u64,
    /// 📦 Every document that went out in a request, final partial flushes included.
    pub documents_submitted: u64,
    /// 📊 What the rate aggregator printed at the end. Its total can trail
    /// `documents_submitted` when final flushes are not reported.
    pub rate: RateSummary,
}

/// 📦 The Supervisor: part middle manager, part helicopter parent.
#[derive(Debug)]
pub(crate) struct Supervisor {
    config: PipelineConfig,
}

impl Supervisor {
    pub(crate) fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// 🚀 Run one ingest from `source` into `sink`, printing progress to `out`.
    ///
    /// `out` gets the target URL first, then one `N/s uploaded` line per second,
    /// then the summary. On failure the summary is never printed.
    pub(crate) async fn run(
        &self,
        mut source: SourceBackend,
        sink: SinkBackend,
        mut out: Box<dyn Write + Send>,
    ) -> Result<RunSummary, PipelineError> {
        let config = &self.config;
        config.validate()?;

        info!("📡 bulk indexing into {}", config.target_url);
        if let Err(err) = writeln!(out, "{}", config.target_url) {
            warn!("⚠️ could not print the target url: {}", err);
        }

        let aggregator = RateAggregator::spawn(out);
        let failure = FailureSignal::new();
        let (lines_tx, lines_rx) = async_channel::bounded(config.line_queue_capacity);
        let (documents_tx, documents_rx) = async_channel::bounded(config.document_queue_capacity);

        let parse_handles: Vec<_> = (0..config.worker_count)
            .map(|id| {
                ParseWorker::new(
                    id,
                    lines_rx.clone(),
                    documents_tx.clone(),
                    config.malformed_policy,
                    failure.clone(),
                )
                .start()
            })
            .collect();
        let batch_handles: Vec<_> = (0..config.worker_count)
            .map(|id| {
                BatchWorker::new(
                    id,
                    documents_rx.clone(),
                    Submitter::new(sink.clone()),
                    aggregator.sampler(),
                    config.batch_size,
                    config.report_final_flush,
                    failure.clone(),
                )
                .start()
            })
            .collect();
        // -- only the workers hold receivers, so a dead pool shows up as a failed send
        drop(lines_rx);
        drop(documents_rx);
        debug!(
            "🧵 started {} parse workers and {} batch workers",
            parse_handles.len(),
            batch_handles.len()
        );

        let feed = feed_lines(&mut source, &lines_tx, &failure).await;
        lines_tx.close();
        let lines_read = match feed {
            Ok(lines_read) => lines_read,
            Err(err) => {
                error!("💀 reading input failed after the pipeline started: {}", err);
                abort_all(&parse_handles);
                abort_all(&batch_handles);
                aggregator.abort();
                return Err(err);
            }
        };
        debug!("🏁 input exhausted after {} lines", lines_read);

        let parse_reports: Vec<ParseReport> = match join_workers(parse_handles).await {
            Ok(reports) => reports,
            Err(err) => {
                abort_all(&batch_handles);
                documents_tx.close();
                aggregator.abort();
                return Err(err);
            }
        };
        // -- every parse worker is gone, nothing else will ever be queued
        documents_tx.close();

        let batch_reports: Vec<BatchReport> = match join_workers(batch_handles).await {
            Ok(reports) => reports,
            Err(err) => {
                aggregator.abort();
                return Err(err);
            }
        };

        // -- every submit has returned, so the aggregator's total is final
        let rate = aggregator.stop().await?;

        Ok(RunSummary {
            target_url: config.target_url.clone(),
            lines_read,
            documents_parsed: parse_reports.iter().map(|r| r.parsed).sum(),
            dead_lettered: parse_reports.iter().map(|r| r.dead_lettered).sum(),
            batches_submitted: batch_reports.iter().map(|r| r.batches).sum(),
            documents_submitted: batch_reports.iter().map(|r| r.documents).sum(),
            rate,
        })
    }
}

/// 🚰 Pump the source into the line queue until EOF, until nobody is listening,
/// or until a worker trips the failure signal.
///
/// The read races the signal, so a source that goes quiet without closing
/// (a live pipe) cannot keep a failed run alive. A failed send means the parse
/// pool closed the queue. Either way the worker's own error surfaces when the
/// supervisor joins the pools, so here the feed just ends.
async fn feed_lines(
    source: &mut SourceBackend,
    lines: &Sender<String>,
    failure: &FailureSignal,
) -> Result<u64, PipelineError> {
    let mut lines_read = 0;
    loop {
        let next = tokio::select! {
            biased;
            _ = failure.tripped() => {
                debug!("🪤 a worker failed, stopped reading at line {}", lines_read);
                break;
            }
            next = source.next_line() => next?,
        };
        let Some(line) = next else { break };
        if lines.send(line).await.is_err() {
            debug!("🚧 line queue closed early, stopped reading at line {}", lines_read);
            break;
        }
        lines_read += 1;
    }
    Ok(lines_read)
}

/// ⏳ Await every handle, in order. The first failure wins; the rest are still awaited.
async fn join_workers<R>(
    handles: Vec<JoinHandle<Result<R, PipelineError>>>,
) -> Result<Vec<R>, PipelineError> {
    let mut reports = Vec::with_capacity(handles.len());
    let mut first_failure = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(err)) => {
                first_failure.get_or_insert(err);
            }
            Err(join_err) => {
                error!("💀 a worker task did not finish: {}", join_err);
                first_failure.get_or_insert(PipelineError::WorkerPanicked(join_err));
            }
        }
    }
    match first_failure {
        Some(err) => Err(err),
        None => Ok(reports),
    }
}

fn abort_all<R>(handles: &[JoinHandle<R>]) {
    for handle in handles {
        handle.abort();
    }
}
