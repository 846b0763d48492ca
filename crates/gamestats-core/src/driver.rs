//! Batch driver loop.
//!
//! [`run`] repeatedly synthesizes a batch of events, hands each one to an
//! [`EventSink`], then sleeps a random pause before the next batch:
//!
//! - **At-most-once**: a failed write is logged and counted; the player
//!   standings it described are not rolled back.
//! - **Stop between batches**: the stop flag is checked before each batch.
//!   Pauses are not interrupted, so shutdown lags by at most one pause.
//! - **Bounded runs**: `max_batches` ends the loop after that many batches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::Rng;
use rand::distr::{Bernoulli, Distribution};
use tracing::{debug, error, info};

use crate::sink::{EventSink, Recorded};
use crate::synthesizer::EventSynthesizer;

/// Events synthesized per batch by default.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default lower bound of the pause between batches.
pub const DEFAULT_MIN_PAUSE: Duration = Duration::from_secs(1);

/// Default upper bound of the pause between batches.
pub const DEFAULT_MAX_PAUSE: Duration = Duration::from_secs(3);

/// Default chance of logging a progress line after a batch.
pub const DEFAULT_PROGRESS_LOG_PROBABILITY: f64 = 0.2;

/// Loop parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    /// Events per batch.
    pub batch_size: usize,
    /// Shortest pause between batches.
    pub min_pause: Duration,
    /// Longest pause between batches.
    pub max_pause: Duration,
    /// Chance in `[0, 1]` of an `info` progress line after each batch.
    pub progress_log_probability: f64,
    /// Stop after this many batches; `None` runs until stopped.
    pub max_batches: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            min_pause: DEFAULT_MIN_PAUSE,
            max_pause: DEFAULT_MAX_PAUSE,
            progress_log_probability: DEFAULT_PROGRESS_LOG_PROBABILITY,
            max_batches: None,
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop flag was raised.
    Requested,
    /// `max_batches` was reached.
    BatchLimit,
}

/// Counters for one run of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Batches completed.
    pub batches: u64,
    /// Events synthesized.
    pub generated: u64,
    /// Events the sink stored.
    pub persisted: u64,
    /// Events the sink already had.
    pub duplicates: u64,
    /// Events the sink failed to store.
    pub failed: u64,
    /// Synthesis attempts that returned an error.
    pub synthesis_errors: u64,
    /// Why the loop ended.
    pub stop_reason: StopReason,
}

/// Run the batch loop until `stop` is raised or the batch limit is hit.
///
/// `rng` drives the pause jitter and the progress log sampling; the
/// synthesizer keeps its own generator.
pub async fn run<R, J, S>(
    synthesizer: &mut EventSynthesizer<R>,
    sink: &mut S,
    rng: &mut J,
    config: &DriverConfig,
    stop: &AtomicBool,
) -> RunSummary
where
    R: Rng,
    J: Rng,
    S: EventSink,
{
    let progress = Bernoulli::new(config.progress_log_probability).ok();
    let mut summary = RunSummary {
        batches: 0,
        generated: 0,
        persisted: 0,
        duplicates: 0,
        failed: 0,
        synthesis_errors: 0,
        stop_reason: StopReason::Requested,
    };

    info!(
        batch_size = config.batch_size,
        min_pause_ms = config.min_pause.as_millis(),
        max_pause_ms = config.max_pause.as_millis(),
        max_batches = ?config.max_batches,
        "Generator loop starting"
    );

    loop {
        if stop.load(Ordering::SeqCst) {
            info!("Stop requested");
            summary.stop_reason = StopReason::Requested;
            return summary;
        }
        if config.max_batches.is_some_and(|max| summary.batches >= max) {
            info!(batches = summary.batches, "Batch limit reached");
            summary.stop_reason = StopReason::BatchLimit;
            return summary;
        }

        for _ in 0..config.batch_size {
            let event = match synthesizer.synthesize() {
                Ok(event) => event,
                Err(e) => {
                    error!(error = %e, "Failed to synthesize event");
                    summary.synthesis_errors = summary.synthesis_errors.saturating_add(1);
                    continue;
                }
            };
            summary.generated = summary.generated.saturating_add(1);

            match sink.record(&event).await {
                Ok(Recorded::Inserted) => {
                    summary.persisted = summary.persisted.saturating_add(1);
                    debug!(
                        player = %event.player_id,
                        event_type = %event.event_type,
                        "Saved event"
                    );
                }
                Ok(Recorded::Duplicate) => {
                    summary.duplicates = summary.duplicates.saturating_add(1);
                    debug!(event_id = %event.event_id, "Event already stored");
                }
                Err(e) => {
                    summary.failed = summary.failed.saturating_add(1);
                    error!(
                        error = %e,
                        event_id = %event.event_id,
                        "Error saving event"
                    );
                }
            }
        }
        summary.batches = summary.batches.saturating_add(1);

        if progress.is_some_and(|p| p.sample(rng)) {
            info!(
                batch_size = config.batch_size,
                total_generated = summary.generated,
                "Generated {} game events",
                config.batch_size
            );
        }

        let pause = draw_pause(rng, config.min_pause, config.max_pause);
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
}

/// Uniform pause in `[min, max]` at millisecond resolution.
///
/// Bounds given in the wrong order are swapped.
pub fn draw_pause<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let lo_ms = u64::try_from(lo.as_millis()).unwrap_or(u64::MAX);
    let hi_ms = u64::try_from(hi.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(rng.random_range(lo_ms..=hi_ms))
}

/// Log a finished run.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        reason = ?summary.stop_reason,
        batches = summary.batches,
        generated = summary.generated,
        persisted = summary.persisted,
        duplicates = summary.duplicates,
        failed = summary.failed,
        synthesis_errors = summary.synthesis_errors,
        "Generator stopped"
    );
}
