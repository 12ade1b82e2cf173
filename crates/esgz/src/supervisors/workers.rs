//! 🧵 Workers: the ones who actually do the work while the Supervisor takes
//! all the credit in the sprint retro.
//!
//! Two pools, same size:
//! - [`ParseWorker`]: line queue → envelope → document queue
//! - [`BatchWorker`]: document queue → batch → submitter → rate sample
//!
//! Each worker is spawned onto the runtime and hands back a typed report or a
//! typed error. Workers never decide the fate of the run; they report, and
//! the supervisor decides.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;

mod batch_worker;
mod parse_worker;

pub(crate) use batch_worker::{BatchReport, BatchWorker};
pub(crate) use parse_worker::{ParseReport, ParseWorker};

/// 🏗️ A background worker, that does work. duh.
pub(crate) trait Worker {
    type Report: Send + 'static;

    /// 🚀 Spawn it. The handle resolves once the worker's input is drained or it failed.
    fn start(self) -> JoinHandle<Result<Self::Report, PipelineError>>;
}

/// 🪤 Tripped by any worker that fails, so whoever is waiting on input (which
/// may never come, think `tail -F`) can stop waiting and let the run end.
///
/// Sticky: once tripped it stays tripped, and waiting on a tripped signal
/// returns immediately.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailureSignal {
    token: CancellationToken,
}

impl FailureSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn trip(&self) {
        self.token.cancel();
    }

    /// ⏳ Resolves once any holder has called [`FailureSignal::trip`].
    pub(crate) async fn tripped(&self) {
        self.token.cancelled().await;
    }
}
