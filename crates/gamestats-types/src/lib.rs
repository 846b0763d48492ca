//! Shared type definitions for the game stats generator.
//!
//! Types defined here flow to the persistence layer and, via `ts-rs`, to
//! `TypeScript` for the stats dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Event and player identifiers
//! - [`enums`] -- Fixed catalogs (event types, zones, weapons, shop items, ...)
//! - [`structs`] -- The [`GameEvent`] record and its [`EventDetails`] payload

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    Currency, Difficulty, EventType, Platform, Reward, ShopItem, StandardMarker, Weapon, Zone,
};
pub use ids::{EventId, PlayerId};
pub use structs::{EventDetails, GameEvent};
