//! Error types for the generator binary.
//!
//! Only startup can fail: bad configuration or a database that never came up.
//! Everything that goes wrong inside the loop is logged and skipped.

use gamestats_db::DbError;

/// Invalid or unparseable environment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but its value does not parse.
    #[error("invalid {name}={value:?}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// `EVENTS_PER_BATCH` was zero.
    #[error("EVENTS_PER_BATCH must be at least 1")]
    EmptyBatch,

    /// The pause bounds are reversed.
    #[error("MIN_PAUSE_MS ({min_ms}) exceeds MAX_PAUSE_MS ({max_ms})")]
    PauseRange {
        /// Lower bound in milliseconds.
        min_ms: u64,
        /// Upper bound in milliseconds.
        max_ms: u64,
    },
}

/// Errors that end the generator process.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The database could not be reached.
    #[error("database error: {0}")]
    Db(#[from] DbError),
}
