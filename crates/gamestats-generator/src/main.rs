//! Synthetic game telemetry generator.
//!
//! Simulates a fixed roster of players and writes a steady stream of game
//! events into the `game_events` table, feeding the stats dashboard with
//! plausible data.
//!
//! # Architecture
//!
//! ```text
//! EventSynthesizer --> driver loop --> GameEventStore --> PostgreSQL
//!        ^                  |
//!  PlayerStateStore     Ctrl-C stop flag
//! ```
//!
//! Startup failures (bad configuration, a database that never comes up) end
//! the process. Failures inside the loop are logged and the loop carries on.

mod config;
mod error;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gamestats_core::driver::{self, RunSummary};
use gamestats_core::{EventSynthesizer, Roster};
use gamestats_db::{GameEventStore, PostgresPool};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{GeneratorConfig, LogFormat};
use crate::error::GeneratorError;

/// Application entry point.
///
/// Loads configuration from the environment, initializes logging, connects
/// to `PostgreSQL` with retry, then runs the event loop until Ctrl-C or the
/// configured batch limit.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the database cannot be
/// reached within the retry budget.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration from environment
    let config = GeneratorConfig::from_env()?;

    // 2. Initialize structured logging
    init_logging(config.log_format);
    info!("gamestats-generator starting");
    info!(
        host = config.postgres.host,
        port = config.postgres.port,
        database = config.postgres.database,
        batch_size = config.driver.batch_size,
        seeded = config.seed.is_some(),
        "configuration loaded"
    );

    let summary = run(&config).await?;
    driver::log_run_end(&summary);
    Ok(())
}

/// Connect, generate until stopped, then close the pool.
async fn run(config: &GeneratorConfig) -> Result<RunSummary, GeneratorError> {
    // 3. Connect to PostgreSQL, waiting for the server to come up
    let pool = PostgresPool::connect_with_retry(&config.postgres, &config.connect_retry).await?;

    // 4. Seed generators: one for synthesis, one for loop timing
    let (synth_rng, mut driver_rng) = seeded_rngs(config.seed);

    // 5. Build the synthesizer over the standard roster
    let mut synthesizer = EventSynthesizer::seeded(Roster::standard(), synth_rng);
    info!(
        players = synthesizer.roster().len(),
        "player standings initialized"
    );

    // 6. Stop on Ctrl-C; the current batch and pause finish first
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received, stopping after current batch");
                stop_flag.store(true, Ordering::SeqCst);
            }
            Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
        }
    });

    // 7. Generate
    let mut sink = GameEventStore::new(pool.pool());
    let summary = driver::run(
        &mut synthesizer,
        &mut sink,
        &mut driver_rng,
        &config.driver,
        &stop,
    )
    .await;

    pool.close().await;
    Ok(summary)
}

/// Generators for synthesis and for loop timing.
///
/// A fixed seed makes both streams reproducible; otherwise both come from
/// OS entropy.
fn seeded_rngs(seed: Option<u64>) -> (StdRng, StdRng) {
    seed.map_or_else(
        || (StdRng::from_os_rng(), StdRng::from_os_rng()),
        |seed| {
            (
                StdRng::seed_from_u64(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            )
        },
    )
}

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
