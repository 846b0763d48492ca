//! The fixed set of players the generator acts for.

use std::collections::BTreeSet;

use gamestats_types::PlayerId;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Number of players on the standard roster.
pub const STANDARD_ROSTER_SIZE: u32 = 20;

/// Errors raised while building a roster.
///
/// These are startup configuration errors; a built [`Roster`] is always
/// non-empty and duplicate-free.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The roster has no players.
    #[error("roster must contain at least one player")]
    Empty,

    /// The same player appears twice.
    #[error("duplicate player on roster: {0}")]
    Duplicate(PlayerId),
}

/// Ordered, non-empty, duplicate-free list of players.
///
/// The first player is held apart from the rest so a roster cannot be built
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    head: PlayerId,
    tail: Vec<PlayerId>,
}

impl Roster {
    /// Build a roster from explicit player ids.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Empty`] for an empty list and
    /// [`RosterError::Duplicate`] if an id repeats.
    pub fn new(players: Vec<PlayerId>) -> Result<Self, RosterError> {
        let mut seen = BTreeSet::new();
        for player in &players {
            if !seen.insert(player) {
                return Err(RosterError::Duplicate(player.clone()));
            }
        }
        let mut players = players.into_iter();
        let head = players.next().ok_or(RosterError::Empty)?;
        Ok(Self {
            head,
            tail: players.collect(),
        })
    }

    /// `Player_1` through `Player_20`.
    pub fn standard() -> Self {
        Self {
            head: PlayerId::numbered(1),
            tail: (2..=STANDARD_ROSTER_SIZE).map(PlayerId::numbered).collect(),
        }
    }

    /// All players in roster order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        std::iter::once(&self.head).chain(&self.tail)
    }

    /// Number of players.
    pub const fn len(&self) -> usize {
        self.tail.len().saturating_add(1)
    }

    /// Always `false`; a roster holds at least one player.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `player` is on the roster.
    pub fn contains(&self, player: &PlayerId) -> bool {
        self.head == *player || self.tail.contains(player)
    }

    /// Pick a player uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &PlayerId {
        let pick = rng.random_range(0..self.len());
        pick.checked_sub(1)
            .and_then(|i| self.tail.get(i))
            .unwrap_or(&self.head)
    }

    /// Every player except `player`, in roster order.
    pub fn opponents_of<'s, 'p>(
        &'s self,
        player: &'p PlayerId,
    ) -> impl Iterator<Item = &'s PlayerId> + use<'s, 'p> {
        self.players().filter(move |p| *p != player)
    }

    /// Pick a player other than `player` uniformly at random.
    ///
    /// Returns `None` when `player` is the only one on the roster.
    pub fn choose_opponent<R: Rng + ?Sized>(
        &self,
        player: &PlayerId,
        rng: &mut R,
    ) -> Option<&PlayerId> {
        let others: Vec<&PlayerId> = self.opponents_of(player).collect();
        others.choose(rng).copied()
    }
}
