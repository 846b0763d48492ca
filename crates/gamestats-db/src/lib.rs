//! `PostgreSQL` persistence for the game stats generator.
//!
//! # Architecture
//!
//! ```text
//! Generator loop
//!     |
//!     +-- bootstrap --------> PostgresPool::connect_with_retry (RetryPolicy)
//!     |
//!     +-- per event --------> GameEventStore::insert (EventSink)
//!                                 |
//!                                 +-- game_events (ON CONFLICT DO NOTHING)
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`retry`] -- Bounded retry with fixed backoff for bootstrap
//! - [`event_store`] -- Single and batch inserts, read-back queries
//! - [`error`] -- Shared error types

pub mod error;
pub mod event_store;
pub mod postgres;
pub mod retry;

// Re-export primary types for convenience.
pub use error::DbError;
pub use event_store::{GameEventRow, GameEventStore};
pub use postgres::{PostgresConfig, PostgresPool};
pub use retry::{RetryExhausted, RetryPolicy};
