//! Event synthesis: one plausible telemetry event per call.
//!
//! Each call picks an acting player and an event type, rolls the
//! type-specific outcome, applies it to the [`PlayerStateStore`], and returns
//! a [`GameEvent`] snapshot of the post-mutation state.
//!
//! | event type | score delta | payload |
//! |---|---|---|
//! | `kill` | 10..=100 | victim, weapon, zone |
//! | `death` | -50..=-5 | killer, zone |
//! | `level_up` | 100..=500 | `new_level`, reward (level +1 first) |
//! | `complete_quest` | 50..=300 | `quest_name`, difficulty, `reward_gold` |
//! | `purchase_item` | 0 | item, price, currency |
//! | `login` / `logout` | 0 | `session_duration`, platform |
//! | everything else | 1..=50 | zone, `standard_event` marker |

use std::ops::RangeInclusive;

use chrono::{DateTime, TimeDelta, Utc};
use gamestats_types::{
    Currency, EventDetails, EventId, EventType, GameEvent, PlayerId, StandardMarker,
};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::roster::{Roster, RosterError};
use crate::state::PlayerStateStore;

/// Events are backdated by a uniform offset in `[0, MAX_BACKDATE_SECS)`.
pub const MAX_BACKDATE_SECS: i64 = 3600;

/// Score awarded for a kill.
pub const KILL_SCORE: RangeInclusive<i64> = 10..=100;
/// Score lost on death.
pub const DEATH_SCORE: RangeInclusive<i64> = -50..=-5;
/// Score awarded on level-up.
pub const LEVEL_UP_SCORE: RangeInclusive<i64> = 100..=500;
/// Score awarded for completing a quest.
pub const QUEST_SCORE: RangeInclusive<i64> = 50..=300;
/// Score awarded for every event type without a dedicated rule.
pub const STANDARD_SCORE: RangeInclusive<i64> = 1..=50;

/// Quest numbers used for `Quest_<n>` names.
pub const QUEST_NUMBERS: RangeInclusive<u32> = 1..=50;
/// Gold paid out for a quest.
pub const QUEST_REWARD_GOLD: RangeInclusive<u32> = 10..=1000;
/// Shop price range.
pub const ITEM_PRICE: RangeInclusive<u32> = 5..=500;
/// Logout session length in seconds.
pub const SESSION_SECONDS: RangeInclusive<u32> = 60..=7200;

/// Errors from a forced synthesis request.
///
/// The uniform [`EventSynthesizer::synthesize`] path only draws players from
/// the roster and never draws an opponent-based event for a solo roster, so
/// neither occurs there.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// The requested actor is not on the roster.
    #[error("player {0} is not on the roster")]
    UnknownPlayer(PlayerId),

    /// A `kill` or `death` was requested but there is nobody to fight.
    #[error("{event_type} for {player} needs a second player on the roster")]
    NoOpponent {
        /// The acting player.
        player: PlayerId,
        /// The requested event type.
        event_type: EventType,
    },
}

/// Produces [`GameEvent`]s and keeps the player standings they describe.
#[derive(Debug)]
pub struct EventSynthesizer<R> {
    roster: Roster,
    store: PlayerStateStore,
    rng: R,
}

impl<R: Rng> EventSynthesizer<R> {
    /// Build a synthesizer over an existing store. The roster is the store's
    /// player set.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::Empty`] if the store tracks no players.
    pub fn new(store: PlayerStateStore, rng: R) -> Result<Self, RosterError> {
        let roster = Roster::new(store.player_ids().cloned().collect())?;
        Ok(Self { roster, store, rng })
    }

    /// Build a synthesizer with freshly rolled standings for `roster`.
    pub fn seeded(roster: Roster, mut rng: R) -> Self {
        let store = PlayerStateStore::seeded(&roster, &mut rng);
        Self { roster, store, rng }
    }

    /// The players this synthesizer acts for.
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Current player standings.
    pub const fn store(&self) -> &PlayerStateStore {
        &self.store
    }

    /// Synthesize one event for a random player and a random event type.
    ///
    /// # Errors
    ///
    /// Never fails for a synthesizer built through [`Self::new`] or
    /// [`Self::seeded`]; the error type is shared with
    /// [`Self::synthesize_as`].
    pub fn synthesize(&mut self) -> Result<GameEvent, SynthesisError> {
        let actor = self.roster.choose(&mut self.rng).clone();
        let event_type = self.draw_event_type();
        self.synthesize_as(&actor, event_type)
    }

    /// Synthesize one event of `event_type` acted by `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::UnknownPlayer`] if `actor` is not on the
    /// roster, and [`SynthesisError::NoOpponent`] for `kill`/`death` on a
    /// one-player roster. State is untouched on error.
    pub fn synthesize_as(
        &mut self,
        actor: &PlayerId,
        event_type: EventType,
    ) -> Result<GameEvent, SynthesisError> {
        if !self.roster.contains(actor) {
            return Err(SynthesisError::UnknownPlayer(actor.clone()));
        }
        let timestamp = self.backdated_now();
        let (score_change, details) = self.roll_outcome(actor, event_type)?;

        let unknown = || SynthesisError::UnknownPlayer(actor.clone());
        let current_score = self
            .store
            .apply_score_delta(actor, score_change)
            .ok_or_else(unknown)?;
        let player_level = self.store.get(actor).map(|s| s.level).ok_or_else(unknown)?;
        let game_zone = details.zone().unwrap_or_else(|| self.rng.random());

        tracing::trace!(
            player = %actor,
            event_type = %event_type,
            score_change,
            current_score,
            player_level,
            "Synthesized event"
        );

        Ok(GameEvent {
            event_id: EventId::new(),
            timestamp,
            player_id: actor.clone(),
            event_type,
            score_change,
            current_score,
            player_level,
            details,
            game_zone,
        })
    }

    /// Uniform over all event types, minus `kill`/`death` on a solo roster.
    fn draw_event_type(&mut self) -> EventType {
        if self.roster.len() > 1 {
            return self.rng.random();
        }
        let solo_types: Vec<EventType> = EventType::ALL
            .iter()
            .copied()
            .filter(|t| !t.requires_opponent())
            .collect();
        solo_types
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(EventType::Login)
    }

    fn backdated_now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let offset = self.rng.random_range(0..MAX_BACKDATE_SECS);
        TimeDelta::try_seconds(offset)
            .and_then(|delta| now.checked_sub_signed(delta))
            .unwrap_or(now)
    }

    /// Roll the score delta and payload for one event.
    ///
    /// `level_up` bumps the stored level here so `new_level` reads the
    /// post-increment value.
    fn roll_outcome(
        &mut self,
        actor: &PlayerId,
        event_type: EventType,
    ) -> Result<(i64, EventDetails), SynthesisError> {
        let rng = &mut self.rng;
        let outcome = match event_type {
            EventType::Kill => {
                let victim = self.roster.choose_opponent(actor, rng).cloned().ok_or_else(|| {
                    SynthesisError::NoOpponent {
                        player: actor.clone(),
                        event_type,
                    }
                })?;
                let details = EventDetails::Kill {
                    victim,
                    weapon: rng.random(),
                    zone: rng.random(),
                };
                (rng.random_range(KILL_SCORE), details)
            }
            EventType::Death => {
                let killer = self.roster.choose_opponent(actor, rng).cloned().ok_or_else(|| {
                    SynthesisError::NoOpponent {
                        player: actor.clone(),
                        event_type,
                    }
                })?;
                let details = EventDetails::Death {
                    killer,
                    zone: rng.random(),
                };
                (rng.random_range(DEATH_SCORE), details)
            }
            EventType::LevelUp => {
                let new_level = self
                    .store
                    .increment_level(actor)
                    .ok_or_else(|| SynthesisError::UnknownPlayer(actor.clone()))?;
                let details = EventDetails::LevelUp {
                    new_level,
                    reward: rng.random(),
                };
                (rng.random_range(LEVEL_UP_SCORE), details)
            }
            EventType::CompleteQuest => {
                let details = EventDetails::Quest {
                    quest_name: format!("Quest_{}", rng.random_range(QUEST_NUMBERS)),
                    difficulty: rng.random(),
                    reward_gold: rng.random_range(QUEST_REWARD_GOLD),
                };
                (rng.random_range(QUEST_SCORE), details)
            }
            EventType::PurchaseItem => {
                let details = EventDetails::Purchase {
                    item: rng.random(),
                    price: rng.random_range(ITEM_PRICE),
                    currency: Currency::Gold,
                };
                (0, details)
            }
            EventType::Login | EventType::Logout => {
                let session_duration = if event_type == EventType::Logout {
                    rng.random_range(SESSION_SECONDS)
                } else {
                    0
                };
                let details = EventDetails::Session {
                    session_duration,
                    platform: rng.random(),
                };
                (0, details)
            }
            EventType::Assist
            | EventType::CaptureFlag
            | EventType::JoinMatch
            | EventType::LeaveMatch
            | EventType::EarnAchievement
            | EventType::SendMessage
            | EventType::JoinClan => {
                let details = EventDetails::Standard {
                    zone: rng.random(),
                    details: StandardMarker::StandardEvent,
                };
                (rng.random_range(STANDARD_SCORE), details)
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::state::Standing;

    fn synth_with(players: &[(&str, u32, i64)], seed: u64) -> EventSynthesizer<SmallRng> {
        let store = PlayerStateStore::from_standings(
            players
                .iter()
                .map(|&(id, level, score)| (PlayerId::from(id), Standing { level, score })),
        );
        EventSynthesizer::new(store, SmallRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn level_up_scenario_on_solo_roster() {
        let mut synth = synth_with(&[("P1", 5, 1000)], 1);
        let p1 = PlayerId::from("P1");
        let event = synth.synthesize_as(&p1, EventType::LevelUp).unwrap();

        assert_eq!(event.player_level, 6);
        assert!((1100..=1500).contains(&event.current_score));
        assert_eq!(event.score_change, event.current_score - 1000);
        assert!(matches!(event.details, EventDetails::LevelUp { new_level: 6, .. }));
        assert_eq!(synth.store().get(&p1), Some(Standing { level: 6, score: event.current_score }));
    }

    #[test]
    fn kill_on_two_player_roster_targets_the_other() {
        let mut synth = synth_with(&[("P1", 1, 100), ("P2", 1, 100)], 2);
        let p1 = PlayerId::from("P1");
        for _ in 0..20 {
            let event = synth.synthesize_as(&p1, EventType::Kill).unwrap();
            assert_eq!(event.details.opponent(), Some(&PlayerId::from("P2")));
            assert!(KILL_SCORE.contains(&event.score_change));
        }
    }

    #[test]
    fn purchase_leaves_score_unchanged() {
        for start in [-400, 0, 100, 49_999] {
            let mut synth = synth_with(&[("P1", 10, start), ("P2", 4, 7)], 3);
            let p1 = PlayerId::from("P1");
            let event = synth.synthesize_as(&p1, EventType::PurchaseItem).unwrap();
            assert_eq!(event.score_change, 0);
            assert_eq!(event.current_score, start);
            assert_eq!(synth.store().get(&p1).map(|s| s.score), Some(start));
            match event.details {
                EventDetails::Purchase { price, currency, .. } => {
                    assert!(ITEM_PRICE.contains(&price));
                    assert_eq!(currency, Currency::Gold);
                }
                other => panic!("unexpected payload {other:?}"),
            }
        }
    }

    #[test]
    fn death_can_drive_score_negative() {
        let mut synth = synth_with(&[("P1", 2, 0), ("P2", 2, 0)], 4);
        let p1 = PlayerId::from("P1");
        let event = synth.synthesize_as(&p1, EventType::Death).unwrap();
        assert!(DEATH_SCORE.contains(&event.score_change));
        assert!(event.current_score < 0);
        assert_eq!(event.details.opponent(), Some(&PlayerId::from("P2")));
    }

    #[test]
    fn login_and_logout_sessions() {
        let mut synth = synth_with(&[("P1", 1, 500)], 5);
        let p1 = PlayerId::from("P1");

        let login = synth.synthesize_as(&p1, EventType::Login).unwrap();
        assert!(matches!(login.details, EventDetails::Session { session_duration: 0, .. }));
        assert_eq!(login.score_change, 0);

        let logout = synth.synthesize_as(&p1, EventType::Logout).unwrap();
        match logout.details {
            EventDetails::Session { session_duration, .. } => {
                assert!(SESSION_SECONDS.contains(&session_duration));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn quest_payload_ranges() {
        let mut synth = synth_with(&[("P1", 1, 500)], 6);
        let p1 = PlayerId::from("P1");
        for _ in 0..50 {
            let event = synth.synthesize_as(&p1, EventType::CompleteQuest).unwrap();
            assert!(QUEST_SCORE.contains(&event.score_change));
            match event.details {
                EventDetails::Quest { quest_name, reward_gold, .. } => {
                    let n: u32 = quest_name.trim_start_matches("Quest_").parse().unwrap();
                    assert!(QUEST_NUMBERS.contains(&n));
                    assert!(QUEST_REWARD_GOLD.contains(&reward_gold));
                }
                other => panic!("unexpected payload {other:?}"),
            }
        }
    }

    #[test]
    fn standard_events_carry_their_zone_outward() {
        let mut synth = synth_with(&[("P1", 1, 500)], 7);
        let p1 = PlayerId::from("P1");
        for event_type in [EventType::Assist, EventType::JoinClan, EventType::SendMessage] {
            let event = synth.synthesize_as(&p1, event_type).unwrap();
            assert!(STANDARD_SCORE.contains(&event.score_change));
            assert_eq!(event.details.zone(), Some(event.game_zone));
            assert_eq!(event.player_level, 1);
        }
    }

    #[test]
    fn forced_errors_leave_state_alone() {
        let mut synth = synth_with(&[("P1", 9, 900)], 8);
        let p1 = PlayerId::from("P1");

        let err = synth.synthesize_as(&p1, EventType::Kill);
        assert!(matches!(err, Err(SynthesisError::NoOpponent { .. })));

        let err = synth.synthesize_as(&PlayerId::from("ghost"), EventType::LevelUp);
        assert!(matches!(err, Err(SynthesisError::UnknownPlayer(_))));

        assert_eq!(synth.store().get(&p1), Some(Standing { level: 9, score: 900 }));
    }

    #[test]
    fn solo_roster_never_draws_opponent_events() {
        let mut synth = synth_with(&[("P1", 1, 100)], 9);
        for _ in 0..1_000 {
            let event = synth.synthesize().unwrap();
            assert!(!event.event_type.requires_opponent());
        }
    }

    #[test]
    fn timestamps_are_backdated_within_an_hour() {
        let mut synth = EventSynthesizer::seeded(Roster::standard(), SmallRng::seed_from_u64(10));
        let before = Utc::now();
        for _ in 0..200 {
            let event = synth.synthesize().unwrap();
            let age = Utc::now().signed_duration_since(event.timestamp);
            assert!(age >= TimeDelta::zero());
            assert!(event.timestamp > before - TimeDelta::seconds(MAX_BACKDATE_SECS + 5));
        }
    }

    #[test]
    fn empty_store_is_rejected() {
        let built = EventSynthesizer::new(PlayerStateStore::default(), SmallRng::seed_from_u64(0));
        assert!(matches!(built, Err(RosterError::Empty)));
    }
}
