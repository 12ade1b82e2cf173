//! 📊 progress.rs: "Are we there yet?" (every pipeline, every time, forever)
//!
//! The rate aggregator is the single task allowed to print progress. Batch
//! workers drop a count into its mailbox after every submitted batch, a
//! one-second ticker makes it print `N/s uploaded`, and a stop signal makes it
//! print the final summary and exit. RUNNING → STOPPED. There is no way back.
//!
//! ⚠️ Watching the rate will not make it go faster. We've tried. Science says no. 🦆

use std::io::Write;
use std::time::Duration;

use async_channel::{Receiver, Sender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::PipelineError;

/// 📈 What the aggregator knew when it was told to stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSummary {
    /// 🔢 Sum of every sample received. Not necessarily every document sent.
    pub total: u64,
    pub elapsed: Duration,
    /// 🚀 `total / elapsed`, or 0 when no time has passed.
    pub docs_per_sec: f64,
}

impl RateSummary {
    fn new(total: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        // -- 💤 zero elapsed (empty input, paused clock) reports 0/s instead of NaN
        let docs_per_sec = if secs > 0.0 { total as f64 / secs } else { 0.0 };
        Self {
            total,
            elapsed,
            docs_per_sec,
        }
    }

    /// 🧾 `Upserted <total> documents in <elapsed>s at <rate>/s`
    pub fn summary_line(&self) -> String {
        format!(
            "Upserted {} documents in {:.2}s at {:.0}/s",
            self.total,
            self.elapsed.as_secs_f64(),
            self.docs_per_sec
        )
    }
}

/// 🔢 The counters. Two numbers and a start time, the entire state machine.
#[derive(Debug)]
struct RateCounters {
    total: u64,
    current: u64,
    started: Instant,
}

impl RateCounters {
    fn new(started: Instant) -> Self {
        Self {
            total: 0,
            current: 0,
            started,
        }
    }

    fn record(&mut self, count: usize) {
        self.total += count as u64;
        self.current += count as u64;
    }

    /// ⏱️ Close the current interval: report it, zero it.
    fn tick(&mut self) -> String {
        let line = format!("{}/s uploaded", self.current);
        self.current = 0;
        line
    }

    fn finish(&self, now: Instant) -> RateSummary {
        RateSummary::new(self.total, now.duration_since(self.started))
    }
}

/// ✉️ The mailbox slot batch workers use to report a submitted batch.
///
/// Unbounded on purpose: recording a sample never waits, so a slow printer can
/// never stall a batch worker, and no count is ever dropped on the floor.
#[derive(Debug, Clone)]
pub(crate) struct RateSampler {
    tx: Sender<usize>,
}

impl RateSampler {
    pub(crate) fn record(&self, count: usize) {
        if self.tx.try_send(count).is_err() {
            // -- 🪦 only happens if the aggregator is already gone, i.e. we're aborting anyway
            debug!("📊 rate aggregator gone, dropped a sample of {}", count);
        }
    }
}

/// 🎛️ Owner's end of a running aggregator: hand out samplers, then stop it.
pub(crate) struct RateAggregatorHandle {
    sampler: RateSampler,
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<RateSummary>,
}

impl RateAggregatorHandle {
    pub(crate) fn sampler(&self) -> RateSampler {
        self.sampler.clone()
    }

    /// 🛑 Send the shutdown signal and wait for the summary to be printed.
    ///
    /// Call this only after every submit has returned, or the total is a guess.
    pub(crate) async fn stop(self) -> Result<RateSummary, PipelineError> {
        // -- the task may already be gone if it panicked; the join below reports that
        let _ = self.stop_tx.send(());
        Ok(self.join.await?)
    }

    /// 🪓 Tear the aggregator down without a summary. For runs that failed.
    pub(crate) fn abort(self) {
        self.join.abort();
        drop(self.stop_tx);
    }
}

/// 📊 The aggregator task itself.
pub(crate) struct RateAggregator {
    samples: Receiver<usize>,
    stop: oneshot::Receiver<()>,
    out: Box<dyn Write + Send>,
    period: Duration,
    started: Instant,
}

impl RateAggregator {
    /// 🚀 Start the aggregator printing to `out` once per second.
    pub(crate) fn spawn(out: Box<dyn Write + Send>) -> RateAggregatorHandle {
        Self::spawn_with_period(out, Duration::from_secs(1))
    }

    pub(crate) fn spawn_with_period(out: Box<dyn Write + Send>, period: Duration) -> RateAggregatorHandle {
        let (tx, samples) = async_channel::unbounded();
        let (stop_tx, stop) = oneshot::channel();
        let aggregator = Self {
            samples,
            stop,
            out,
            period,
            started: Instant::now(),
        };
        RateAggregatorHandle {
            sampler: RateSampler { tx },
            stop_tx,
            join: tokio::spawn(aggregator.run()),
        }
    }

    async fn run(mut self) -> RateSummary {
        let mut counters = RateCounters::new(self.started);
        // -- ⏱️ first tick one period in, not at t=0, so the first line covers a full second
        let mut ticker = tokio::time::interval_at(self.started + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut samples_open = true;
        let stopped_cleanly = loop {
            tokio::select! {
                biased;
                sample = self.samples.recv(), if samples_open => match sample {
                    Ok(count) => counters.record(count),
                    Err(_) => samples_open = false,
                },
                _ = ticker.tick() => {
                    let line = counters.tick();
                    emit(self.out.as_mut(), &line);
                }
                // -- a dropped sender means the run was torn down: stop, but print no summary
                stopped = &mut self.stop => break stopped.is_ok(),
            }
        };

        // -- 🧹 anything sent before the stop still counts
        while let Ok(count) = self.samples.try_recv() {
            counters.record(count);
        }

        let summary = counters.finish(Instant::now());
        if !stopped_cleanly {
            debug!("📊 rate aggregator dropped without a stop, {} documents unreported", summary.total);
            return summary;
        }
        let line = summary.summary_line();
        emit(self.out.as_mut(), &line);
        info!("🏁 {}", line);
        summary
    }
}

fn emit(out: &mut (dyn Write + Send), line: &str) {
    debug!("📊 {}", line);
    if let Err(err) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
        warn!("⚠️ could not write progress line '{}': {}", line, err);
    }
}

/// 🧪 A `Write` that tests can read back. Clone it, hand one copy to the
/// aggregator, keep the other.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    pub(crate) fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().expect("💀 poisoned test buffer").clone();
        String::from_utf8(bytes)
            .expect("💀 progress output should be UTF-8")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("💀 poisoned test buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
