//! The persistence seam between the driver loop and a backing store.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::future::Future;

use gamestats_types::{EventId, GameEvent};

/// Outcome of handing one event to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// The event was stored.
    Inserted,
    /// An event with the same id was already stored; nothing changed.
    Duplicate,
}

/// Accepts synthesized events one at a time.
///
/// Inserts are idempotent by [`EventId`]: recording the same event twice
/// yields [`Recorded::Duplicate`] the second time.
pub trait EventSink {
    /// Failure type surfaced to the driver, which logs it and moves on.
    type Error: std::fmt::Display;

    /// Store one event.
    fn record(
        &mut self,
        event: &GameEvent,
    ) -> impl Future<Output = Result<Recorded, Self::Error>> + Send;
}

/// In-memory sink that keeps every event it receives.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Vec<GameEvent>,
    ids: BTreeSet<EventId>,
}

impl MemorySink {
    /// Create an empty sink.
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            ids: BTreeSet::new(),
        }
    }

    /// Events stored so far, in arrival order.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }
}

impl EventSink for MemorySink {
    type Error = Infallible;

    async fn record(&mut self, event: &GameEvent) -> Result<Recorded, Self::Error> {
        if !self.ids.insert(event.event_id) {
            return Ok(Recorded::Duplicate);
        }
        self.events.push(event.clone());
        Ok(Recorded::Inserted)
    }
}
