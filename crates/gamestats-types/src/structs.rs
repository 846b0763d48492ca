//! Event records produced by the synthesizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    Currency, Difficulty, EventType, Platform, Reward, ShopItem, StandardMarker, Weapon, Zone,
};
use crate::ids::{EventId, PlayerId};

// ---------------------------------------------------------------------------
// Details payloads
// ---------------------------------------------------------------------------

/// Type-specific payload attached to a [`GameEvent`].
///
/// Serializes as a flat JSON object (no variant tag), which is the shape the
/// `details` column carries:
///
/// ```text
/// {"victim":"Player_4","weapon":"Axe","zone":"Desert"}
/// {"new_level":12,"reward":"skill_point"}
/// {"zone":"City","details":"standard_event"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(untagged)]
pub enum EventDetails {
    /// Payload for `kill`.
    Kill {
        /// The defeated player.
        victim: PlayerId,
        /// Weapon used.
        weapon: Weapon,
        /// Where it happened.
        zone: Zone,
    },
    /// Payload for `death`.
    Death {
        /// The player who scored the kill.
        killer: PlayerId,
        /// Where it happened.
        zone: Zone,
    },
    /// Payload for `level_up`.
    LevelUp {
        /// The level reached.
        new_level: u32,
        /// Reward granted.
        reward: Reward,
    },
    /// Payload for `complete_quest`.
    Quest {
        /// Quest name, `Quest_1` through `Quest_50`.
        quest_name: String,
        /// Difficulty tier.
        difficulty: Difficulty,
        /// Gold awarded.
        reward_gold: u32,
    },
    /// Payload for `purchase_item`.
    Purchase {
        /// What was bought.
        item: ShopItem,
        /// Price paid.
        price: u32,
        /// Currency used.
        currency: Currency,
    },
    /// Payload for `login` and `logout`.
    Session {
        /// Session length in seconds; zero for logins.
        session_duration: u32,
        /// Client platform.
        platform: Platform,
    },
    /// Payload for every event type without a dedicated shape.
    Standard {
        /// Where it happened.
        zone: Zone,
        /// Always [`StandardMarker::StandardEvent`].
        details: StandardMarker,
    },
}

impl EventDetails {
    /// The zone carried by the payload, if the payload has one.
    pub const fn zone(&self) -> Option<Zone> {
        match self {
            Self::Kill { zone, .. } | Self::Death { zone, .. } | Self::Standard { zone, .. } => {
                Some(*zone)
            }
            Self::LevelUp { .. } | Self::Quest { .. } | Self::Purchase { .. } | Self::Session { .. } => {
                None
            }
        }
    }

    /// The other player named by the payload (victim or killer).
    pub const fn opponent(&self) -> Option<&PlayerId> {
        match self {
            Self::Kill { victim, .. } => Some(victim),
            Self::Death { killer, .. } => Some(killer),
            _ => None,
        }
    }

    /// Serialize the payload to the JSON text stored in the `details` column.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// One synthesized telemetry event.
///
/// `current_score` and `player_level` are snapshots of the player's standing
/// taken right after the event was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameEvent {
    /// Unique event identifier.
    pub event_id: EventId,
    /// When the event happened (backdated up to an hour).
    pub timestamp: DateTime<Utc>,
    /// The acting player.
    pub player_id: PlayerId,
    /// The category of event.
    pub event_type: EventType,
    /// Signed change applied to the player's score.
    pub score_change: i64,
    /// Player score after the change.
    pub current_score: i64,
    /// Player level after the event.
    pub player_level: u32,
    /// Type-specific payload.
    pub details: EventDetails,
    /// Zone the event is attributed to.
    pub game_zone: Zone,
}
