//! 🎬 *[a line arrives. it is just text. it has no idea it's about to get a header.]*
//!
//! 🔎 The ParseWorker: pulls raw lines, turns each into a [`LogDocument`], and
//! pushes it onto the document queue. That push is where backpressure bites:
//! when the batch workers fall behind, the queue fills, this worker waits,
//! the line queue fills, and the reader upstream waits too. Memory stays flat.

use async_channel::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::{FailureSignal, Worker};
use crate::app_config::MalformedPolicy;
use crate::common::LogDocument;
use crate::error::PipelineError;
use crate::transforms::{BulkEnvelope, IngestTransform};

/// 📋 What one parse worker got through before its queue ran dry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParseReport {
    pub parsed: u64,
    pub dead_lettered: u64,
}

#[derive(Debug)]
pub(crate) struct ParseWorker {
    id: usize,
    lines: Receiver<String>,
    documents: Sender<LogDocument>,
    malformed_policy: MalformedPolicy,
    failure: FailureSignal,
}

impl ParseWorker {
    pub(crate) fn new(
        id: usize,
        lines: Receiver<String>,
        documents: Sender<LogDocument>,
        malformed_policy: MalformedPolicy,
        failure: FailureSignal,
    ) -> Self {
        Self {
            id,
            lines,
            documents,
            malformed_policy,
            failure,
        }
    }
}

impl Worker for ParseWorker {
    type Report = ParseReport;

    fn start(self) -> JoinHandle<Result<ParseReport, PipelineError>> {
        tokio::spawn(async move {
            debug!("🔎 ParseWorker {} started", self.id);
            let mut report = ParseReport::default();

            // -- recv() errs only once the line queue is closed AND drained
            while let Ok(line) = self.lines.recv().await {
                match BulkEnvelope::transform_line(line) {
                    Ok(document) => {
                        if self.documents.send(document).await.is_err() {
                            // -- 🚧 a batch worker slammed the door. stop pulling input too.
                            debug!(
                                "🚧 ParseWorker {}: document queue closed early, standing down",
                                self.id
                            );
                            self.lines.close();
                            break;
                        }
                        report.parsed += 1;
                    }
                    Err(err)
                        if err.is_malformed_input()
                            && self.malformed_policy == MalformedPolicy::DeadLetter =>
                    {
                        warn!("📮 ParseWorker {} dead-lettered a line: {}", self.id, err);
                        report.dead_lettered += 1;
                    }
                    Err(err) => {
                        error!("💀 ParseWorker {}: {}", self.id, err);
                        // -- closing the line queue fails the reader's next send; the trip
                        // -- wakes it if it's still waiting on input. nothing past this line gets read.
                        self.lines.close();
                        self.failure.trip();
                        return Err(err);
                    }
                }
            }

            debug!(
                "🏁 ParseWorker {} done: {} parsed, {} dead-lettered",
                self.id, report.parsed, report.dead_lettered
            );
            Ok(report)
        })
    }
}
