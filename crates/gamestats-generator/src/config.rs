//! Configuration for the generator binary.
//!
//! All configuration is loaded from environment variables, each with a fixed
//! default suited to the compose deployment (database host `postgres`).

use std::str::FromStr;
use std::time::Duration;

use gamestats_core::DriverConfig;
use gamestats_core::driver::DEFAULT_PROGRESS_LOG_PROBABILITY;
use gamestats_db::{PostgresConfig, RetryPolicy};

use crate::error::ConfigError;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}` (expected pretty or json)")),
        }
    }
}

/// Complete generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Database connection settings.
    pub postgres: PostgresConfig,
    /// Connection bootstrap budget.
    pub connect_retry: RetryPolicy,
    /// Batch loop settings.
    pub driver: DriverConfig,
    /// Fixed seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
    /// Log line rendering.
    pub log_format: LogFormat,
}

impl GeneratorConfig {
    /// Load configuration from the process environment.
    ///
    /// Variables (all optional):
    /// - `DB_HOST` -- database host (default `postgres`)
    /// - `DB_PORT` -- database port (default 5432)
    /// - `DB_NAME` -- database name (default `game_stats_db`)
    /// - `DB_USER` / `DB_PASSWORD` -- credentials (default `game_user` / `game_pass`)
    /// - `DB_CONNECT_ATTEMPTS` -- connection attempts before giving up (default 10)
    /// - `DB_CONNECT_BACKOFF_MS` -- wait between attempts (default 3000)
    /// - `EVENTS_PER_BATCH` -- events per batch (default 5)
    /// - `MIN_PAUSE_MS` / `MAX_PAUSE_MS` -- pause between batches (default 1000 / 3000)
    /// - `MAX_BATCHES` -- stop after this many batches (default: run forever)
    /// - `GENERATOR_SEED` -- fixed RNG seed (default: OS entropy)
    /// - `LOG_FORMAT` -- `pretty` or `json` (default `pretty`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    /// or `None` when unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        let port: u16 = parse_or(&lookup, "DB_PORT", 5432)?;
        let postgres = PostgresConfig::new(
            &text("DB_HOST", "postgres"),
            &text("DB_NAME", "game_stats_db"),
        )
        .with_port(port)
        .with_credentials(&text("DB_USER", "game_user"), &text("DB_PASSWORD", "game_pass"));

        let attempts: u32 = parse_or(&lookup, "DB_CONNECT_ATTEMPTS", 10)?;
        let backoff_ms: u64 = parse_or(&lookup, "DB_CONNECT_BACKOFF_MS", 3000)?;
        let connect_retry = RetryPolicy::new(attempts, Duration::from_millis(backoff_ms));

        let batch_size: usize = parse_or(&lookup, "EVENTS_PER_BATCH", 5)?;
        if batch_size == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        let min_ms: u64 = parse_or(&lookup, "MIN_PAUSE_MS", 1000)?;
        let max_ms: u64 = parse_or(&lookup, "MAX_PAUSE_MS", 3000)?;
        if min_ms > max_ms {
            return Err(ConfigError::PauseRange { min_ms, max_ms });
        }
        let max_batches: Option<u64> = parse_optional(&lookup, "MAX_BATCHES")?;

        let driver = DriverConfig {
            batch_size,
            min_pause: Duration::from_millis(min_ms),
            max_pause: Duration::from_millis(max_ms),
            progress_log_probability: DEFAULT_PROGRESS_LOG_PROBABILITY,
            max_batches,
        };

        Ok(Self {
            postgres,
            connect_retry,
            driver,
            seed: parse_optional(&lookup, "GENERATOR_SEED")?,
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
        })
    }
}

/// Parse a variable, falling back to `default` when unset.
fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(lookup, name)?.unwrap_or(default))
}

/// Parse a variable that may be unset. Blank values count as unset.
fn parse_optional<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value: raw,
        })
}
