//! 📦 The BatchWorker: fills a batch, ships it, reports it, repeats.
//!
//! Each worker owns its accumulator and its [`Submitter`]. Nothing is shared
//! between batch workers except the document queue they all pull from, so a
//! document lands in exactly one batch and a worker's batches keep the order
//! in which that worker pulled its documents.

use async_channel::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::{FailureSignal, Worker};
use crate::common::LogDocument;
use crate::error::PipelineError;
use crate::progress::RateSampler;
use crate::submitter::Submitter;

/// 📋 What one batch worker shipped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BatchReport {
    /// 📡 Requests sent, final partial flush included.
    pub batches: u64,
    /// 📄 Documents sent across all of those requests.
    pub documents: u64,
    /// 📊 Documents reported to the rate aggregator.
    pub sampled_documents: u64,
    /// 🧹 Size of the final partial flush. 0 when the last batch was full or there was none.
    pub final_flush_documents: u64,
}

#[derive(Debug)]
pub(crate) struct BatchWorker {
    id: usize,
    documents: Receiver<LogDocument>,
    submitter: Submitter,
    sampler: RateSampler,
    batch_size: usize,
    report_final_flush: bool,
    failure: FailureSignal,
}

impl BatchWorker {
    pub(crate) fn new(
        id: usize,
        documents: Receiver<LogDocument>,
        submitter: Submitter,
        sampler: RateSampler,
        batch_size: usize,
        report_final_flush: bool,
        failure: FailureSignal,
    ) -> Self {
        Self {
            id,
            documents,
            submitter,
            sampler,
            batch_size,
            report_final_flush,
            failure,
        }
    }

    async fn drain(&mut self) -> Result<BatchReport, PipelineError> {
        let mut report = BatchReport::default();
        let mut batch: Vec<LogDocument> = Vec::with_capacity(self.batch_size);

        while let Ok(document) = self.documents.recv().await {
            batch.push(document);
            if batch.len() >= self.batch_size {
                self.submitter.submit(&batch).await?;
                report.batches += 1;
                report.documents += batch.len() as u64;
                report.sampled_documents += batch.len() as u64;
                self.sampler.record(batch.len());
                batch.clear();
            }
        }

        // -- 🧹 queue closed and drained. whatever's left goes out as one short batch.
        if !batch.is_empty() {
            self.submitter.submit(&batch).await?;
            report.batches += 1;
            report.documents += batch.len() as u64;
            report.final_flush_documents = batch.len() as u64;
            if self.report_final_flush {
                report.sampled_documents += batch.len() as u64;
                self.sampler.record(batch.len());
            }
        }

        self.submitter.close().await?;
        Ok(report)
    }
}

impl Worker for BatchWorker {
    type Report = BatchReport;

    fn start(mut self) -> JoinHandle<Result<BatchReport, PipelineError>> {
        tokio::spawn(async move {
            debug!(
                "📦 BatchWorker {} started, batch size {}",
                self.id, self.batch_size
            );
            match self.drain().await {
                Ok(report) => {
                    debug!(
                        "🏁 BatchWorker {} done: {} docs in {} batches, {} sampled, {} in the final flush",
                        self.id,
                        report.documents,
                        report.batches,
                        report.sampled_documents,
                        report.final_flush_documents
                    );
                    Ok(report)
                }
                Err(err) => {
                    error!("💀 BatchWorker {}: {}", self.id, err);
                    // -- parse workers see the closed queue on their next send and stand down;
                    // -- the trip reaches the reader even if no send ever comes
                    self.documents.close();
                    self.failure.trip();
                    Err(err)
                }
            }
        })
    }
}
