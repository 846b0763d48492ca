//! Integration tests for the `gamestats-db` data layer.
//!
//! These tests require a live `PostgreSQL` instance. Run with:
//!
//! ```bash
//! docker compose up -d postgres
//! cargo test -p gamestats-db -- --ignored
//! ```
//!
//! Connection settings come from `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`
//! and `DB_PASSWORD`, defaulting to a local instance. All tests are marked
//! `#[ignore]` so they are skipped during normal `cargo test` runs.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use gamestats_core::driver::{self, DriverConfig, StopReason};
use gamestats_core::{EventSink, EventSynthesizer, Recorded, Roster};
use gamestats_db::{DbError, GameEventStore, PostgresConfig, PostgresPool, RetryPolicy};
use gamestats_types::{EventDetails, EventId, EventType, PlayerId};
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Table definition used when the database has none yet.
const GAME_EVENTS_DDL: &str = include_str!("fixtures/game_events.sql");

fn test_config() -> PostgresConfig {
    let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_owned());
    PostgresConfig::new(&var("DB_HOST", "localhost"), &var("DB_NAME", "game_stats_db"))
        .with_port(var("DB_PORT", "5432").parse().expect("DB_PORT must be a port number"))
        .with_credentials(&var("DB_USER", "game_user"), &var("DB_PASSWORD", "game_pass"))
}

// =============================================================================
// Helper: connect to PostgreSQL and make sure the table exists
// =============================================================================

async fn setup_postgres() -> PostgresPool {
    let pool = PostgresPool::connect(&test_config())
        .await
        .expect("Failed to connect to PostgreSQL -- is Docker running?");
    sqlx::raw_sql(GAME_EVENTS_DDL)
        .execute(pool.pool())
        .await
        .expect("Failed to create game_events table");
    pool
}

fn synthesizer(seed: u64) -> EventSynthesizer<SmallRng> {
    EventSynthesizer::seeded(Roster::standard(), SmallRng::seed_from_u64(seed))
}

/// Roster whose names no other test writes, so row counts stay isolated
/// while tests share the table.
fn private_roster(tag: &str, size: u32) -> Roster {
    let run = uuid::Uuid::new_v4().simple().to_string();
    let players = (1..=size)
        .map(|n| PlayerId::new(format!("{tag}-{}-{n}", &run[..12])))
        .collect();
    Roster::new(players).expect("generated names are unique")
}

/// Stored rows among `ids`.
async fn count_stored(pool: &PostgresPool, ids: &[EventId]) -> i64 {
    let ids: Vec<uuid::Uuid> = ids.iter().copied().map(EventId::into_inner).collect();
    sqlx::query_scalar("SELECT COUNT(*) FROM game_events WHERE event_id = ANY($1)")
        .bind(&ids)
        .fetch_one(pool.pool())
        .await
        .expect("count query")
}

/// Stored rows written by any player on `roster`.
async fn count_for_roster(pool: &PostgresPool, roster: &Roster) -> i64 {
    let names: Vec<String> = roster.players().map(|p| p.as_str().to_owned()).collect();
    sqlx::query_scalar("SELECT COUNT(*) FROM game_events WHERE player_id = ANY($1)")
        .bind(&names)
        .fetch_one(pool.pool())
        .await
        .expect("count query")
}

// =============================================================================
// Inserts
// =============================================================================

#[tokio::test]
#[ignore = "requires live PostgreSQL instance (docker compose up -d)"]
async fn insert_and_read_back() {
    let pool = setup_postgres().await;
    let store = GameEventStore::new(pool.pool());
    let mut synth = synthesizer(1);

    let event = synth.synthesize().unwrap();
    assert_eq!(store.insert(&event).await.unwrap(), Recorded::Inserted);

    let row = store
        .get(event.event_id)
        .await
        .unwrap()
        .expect("row should exist");
    assert_eq!(row.event_id, event.event_id.to_string());
    assert_eq!(row.player_id, event.player_id.as_str());
    assert_eq!(row.event_type, event.event_type.as_str());
    assert_eq!(row.score_change, event.score_change);
    assert_eq!(row.current_score, event.current_score);
    assert_eq!(row.player_level, i64::from(event.player_level));
    assert_eq!(row.game_zone.as_deref(), Some(event.game_zone.as_str()));

    let stored: EventDetails =
        serde_json::from_str(row.details.as_deref().unwrap()).expect("details are JSON");
    assert_eq!(stored, event.details);

    pool.close().await;
}

#[tokio::test]
#[ignore = "requires live PostgreSQL instance (docker compose up -d)"]
async fn duplicate_event_id_is_not_an_error() {
    let pool = setup_postgres().await;
    let mut store = GameEventStore::new(pool.pool());
    let mut synth = synthesizer(2);
    let event = synth.synthesize().unwrap();

    assert_eq!(store.record(&event).await.unwrap(), Recorded::Inserted);
    assert_eq!(store.record(&event).await.unwrap(), Recorded::Duplicate);

    pool.close().await;
}

#[tokio::test]
#[ignore = "requires live PostgreSQL instance (docker compose up -d)"]
async fn batch_insert_skips_existing_ids() {
    let pool = setup_postgres().await;
    let store = GameEventStore::new(pool.pool()).with_batch_size(7);
    let mut synth = synthesizer(3);

    let events: Vec<_> = (0..20).map(|_| synth.synthesize().unwrap()).collect();
    let ids: Vec<EventId> = events.iter().map(|e| e.event_id).collect();
    store.insert(&events[0]).await.unwrap();

    let inserted = store.batch_insert(&events).await.unwrap();

    assert_eq!(inserted, 19);
    assert_eq!(count_stored(&pool, &ids).await, 20);

    pool.close().await;
}

#[tokio::test]
#[ignore = "requires live PostgreSQL instance (docker compose up -d)"]
async fn player_history_is_newest_first() {
    let pool = setup_postgres().await;
    let store = GameEventStore::new(pool.pool());
    let roster = private_roster("hist", 1);
    let player = roster.players().next().unwrap().clone();
    let mut synth = EventSynthesizer::seeded(roster, SmallRng::seed_from_u64(4));

    for _ in 0..5 {
        let event = synth.synthesize_as(&player, EventType::CompleteQuest).unwrap();
        store.insert(&event).await.unwrap();
    }

    let rows = store.events_for_player(&player, 5).await.unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert!(rows.iter().all(|r| r.player_id == player.as_str()));

    pool.close().await;
}

// =============================================================================
// Driver against the real sink
// =============================================================================

#[tokio::test]
#[ignore = "requires live PostgreSQL instance (docker compose up -d)"]
async fn driver_persists_every_generated_event() {
    let pool = setup_postgres().await;
    let mut store = GameEventStore::new(pool.pool());
    let roster = private_roster("drv", 4);
    let mut synth = EventSynthesizer::seeded(roster.clone(), SmallRng::seed_from_u64(5));
    let mut rng = SmallRng::seed_from_u64(6);
    let config = DriverConfig {
        batch_size: 5,
        min_pause: Duration::ZERO,
        max_pause: Duration::ZERO,
        progress_log_probability: 0.2,
        max_batches: Some(4),
    };
    let stop = AtomicBool::new(false);

    let summary = driver::run(&mut synth, &mut store, &mut rng, &config, &stop).await;

    assert_eq!(summary.stop_reason, StopReason::BatchLimit);
    assert_eq!(summary.persisted, 20);
    assert_eq!(summary.failed, 0);
    assert_eq!(count_for_roster(&pool, &roster).await, 20);
    assert!(store.count().await.unwrap() >= 20);

    pool.close().await;
}

// =============================================================================
// Bootstrap
// =============================================================================

#[tokio::test]
#[ignore = "requires an unused local port; slow by design of the retry budget"]
async fn unreachable_server_exhausts_retries() {
    let config = PostgresConfig::new("127.0.0.1", "nowhere")
        .with_port(1)
        .with_connect_timeout(Duration::from_millis(200));
    let policy = RetryPolicy::new(2, Duration::from_millis(10));

    let result = PostgresPool::connect_with_retry(&config, &policy).await;

    assert!(matches!(
        result,
        Err(DbError::RetriesExhausted { attempts: 2, .. })
    ));
}
