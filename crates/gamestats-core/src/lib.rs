//! Player state, event synthesis, and the batch driver for the game stats
//! generator.
//!
//! Nothing in this crate touches the network or the database. Persistence is
//! reached through the [`EventSink`] trait, implemented by `gamestats-db`.
//!
//! # Modules
//!
//! - [`roster`] -- The fixed, non-empty set of players.
//! - [`state`] -- [`PlayerStateStore`]: level and score per player.
//! - [`synthesizer`] -- [`EventSynthesizer`]: per-event-type rules.
//! - [`sink`] -- [`EventSink`] trait and the in-memory [`MemorySink`].
//! - [`driver`] -- Batch loop with randomized pauses and a stop flag.
//!
//! [`EventSink`]: sink::EventSink
//! [`MemorySink`]: sink::MemorySink
//! [`PlayerStateStore`]: state::PlayerStateStore
//! [`EventSynthesizer`]: synthesizer::EventSynthesizer

pub mod driver;
pub mod roster;
pub mod sink;
pub mod state;
pub mod synthesizer;

pub use driver::{DriverConfig, RunSummary, StopReason};
pub use roster::{Roster, RosterError};
pub use sink::{EventSink, MemorySink, Recorded};
pub use state::{PlayerStateStore, Standing};
pub use synthesizer::{EventSynthesizer, SynthesisError};
