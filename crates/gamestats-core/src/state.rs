//! Per-player level and score.
//!
//! [`PlayerStateStore`] is the source of truth the synthesizer mutates. It is
//! not persisted; a restart rolls a fresh set of standings.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use gamestats_types::PlayerId;
use rand::Rng;

use crate::roster::Roster;

/// Range a player's starting level is drawn from.
pub const STARTING_LEVEL: RangeInclusive<u32> = 1..=50;

/// Range a player's starting score is drawn from.
pub const STARTING_SCORE: RangeInclusive<i64> = 100..=50_000;

/// A player's current level and cumulative score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    /// Current level, never decreases.
    pub level: u32,
    /// Cumulative score. Unclamped, so it may go negative.
    pub score: i64,
}

/// Mapping from player to [`Standing`], mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStateStore {
    standings: BTreeMap<PlayerId, Standing>,
}

impl PlayerStateStore {
    /// Roll random starting standings for every player on `roster`.
    pub fn seeded<R: Rng + ?Sized>(roster: &Roster, rng: &mut R) -> Self {
        let standings = roster
            .players()
            .map(|player| {
                let standing = Standing {
                    level: rng.random_range(STARTING_LEVEL),
                    score: rng.random_range(STARTING_SCORE),
                };
                (player.clone(), standing)
            })
            .collect();
        Self { standings }
    }

    /// Build a store from explicit standings.
    pub fn from_standings(standings: impl IntoIterator<Item = (PlayerId, Standing)>) -> Self {
        Self {
            standings: standings.into_iter().collect(),
        }
    }

    /// Current standing of `player`, or `None` if the player is unknown.
    pub fn get(&self, player: &PlayerId) -> Option<Standing> {
        self.standings.get(player).copied()
    }

    /// Add `delta` to the player's score and return the new score.
    ///
    /// There is no floor or ceiling beyond saturation at the `i64` limits.
    pub fn apply_score_delta(&mut self, player: &PlayerId, delta: i64) -> Option<i64> {
        let standing = self.standings.get_mut(player)?;
        standing.score = standing.score.saturating_add(delta);
        Some(standing.score)
    }

    /// Bump the player's level by one and return the new level.
    pub fn increment_level(&mut self, player: &PlayerId) -> Option<u32> {
        let standing = self.standings.get_mut(player)?;
        standing.level = standing.level.saturating_add(1);
        Some(standing.level)
    }

    /// Player ids in sorted order.
    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.standings.keys()
    }

    /// Iterate over all standings in player order.
    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &Standing)> {
        self.standings.iter()
    }

    /// Number of tracked players.
    pub fn len(&self) -> usize {
        self.standings.len()
    }

    /// Whether no players are tracked.
    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }
}
