//! Operations on the `game_events` table.
//!
//! Inserts are idempotent by `event_id`: a repeated id is reported as
//! [`Recorded::Duplicate`] instead of an error. The `details` payload is
//! stored as JSON text.

use gamestats_core::{EventSink, Recorded};
use gamestats_types::{EventId, GameEvent, PlayerId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Default batch size for multi-row inserts.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Column list shared by reads.
const SELECT_COLUMNS: &str = r#"event_id::TEXT AS event_id,
       "timestamp"::TIMESTAMPTZ AS "timestamp",
       player_id::TEXT AS player_id,
       event_type::TEXT AS event_type,
       score_change::BIGINT AS score_change,
       current_score::BIGINT AS current_score,
       player_level::BIGINT AS player_level,
       details::TEXT AS details,
       game_zone::TEXT AS game_zone"#;

/// Operations on the `game_events` table.
pub struct GameEventStore<'a> {
    pool: &'a PgPool,
    batch_size: usize,
}

impl<'a> GameEventStore<'a> {
    /// Create a new event store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size for [`Self::batch_insert`].
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Insert one event in its own transaction.
    ///
    /// A failure rolls the transaction back, leaving no partial row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the payload cannot be encoded
    /// and [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, event: &GameEvent) -> Result<Recorded, DbError> {
        let details = event.details.to_text()?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"INSERT INTO game_events
                 (event_id, "timestamp", player_id, event_type, score_change,
                  current_score, player_level, details, game_zone)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               ON CONFLICT (event_id) DO NOTHING"#,
        )
        .bind(event.event_id.into_inner())
        .bind(event.timestamp)
        .bind(event.player_id.as_str())
        .bind(event.event_type.as_str())
        .bind(event.score_change)
        .bind(event.current_score)
        .bind(i64::from(event.player_level))
        .bind(details)
        .bind(event.game_zone.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if result.rows_affected() == 0 {
            tracing::warn!(event_id = %event.event_id, "Event id already stored");
            Ok(Recorded::Duplicate)
        } else {
            Ok(Recorded::Inserted)
        }
    }

    /// Insert many events using chunked `UNNEST` statements.
    ///
    /// Each chunk commits on its own. Rows whose id already exists are
    /// skipped. Returns the number of rows actually inserted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on the first chunk that fails; earlier chunks stay
    /// committed.
    pub async fn batch_insert(&self, events: &[GameEvent]) -> Result<u64, DbError> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut inserted: u64 = 0;
        for chunk in events.chunks(self.batch_size.max(1)) {
            let len = chunk.len();
            let mut ids: Vec<Uuid> = Vec::with_capacity(len);
            let mut timestamps = Vec::with_capacity(len);
            let mut players: Vec<String> = Vec::with_capacity(len);
            let mut event_types: Vec<String> = Vec::with_capacity(len);
            let mut score_changes: Vec<i64> = Vec::with_capacity(len);
            let mut scores: Vec<i64> = Vec::with_capacity(len);
            let mut levels: Vec<i64> = Vec::with_capacity(len);
            let mut details: Vec<String> = Vec::with_capacity(len);
            let mut zones: Vec<String> = Vec::with_capacity(len);

            for event in chunk {
                ids.push(event.event_id.into_inner());
                timestamps.push(event.timestamp);
                players.push(event.player_id.as_str().to_owned());
                event_types.push(event.event_type.as_str().to_owned());
                score_changes.push(event.score_change);
                scores.push(event.current_score);
                levels.push(i64::from(event.player_level));
                details.push(event.details.to_text()?);
                zones.push(event.game_zone.as_str().to_owned());
            }

            let mut tx = self.pool.begin().await?;
            let result = sqlx::query(
                r#"INSERT INTO game_events
                     (event_id, "timestamp", player_id, event_type, score_change,
                      current_score, player_level, details, game_zone)
                   SELECT * FROM UNNEST($1::UUID[], $2::TIMESTAMPTZ[], $3::TEXT[], $4::TEXT[],
                                        $5::BIGINT[], $6::BIGINT[], $7::BIGINT[], $8::TEXT[], $9::TEXT[])
                   ON CONFLICT (event_id) DO NOTHING"#,
            )
            .bind(&ids)
            .bind(&timestamps)
            .bind(&players)
            .bind(&event_types)
            .bind(&score_changes)
            .bind(&scores)
            .bind(&levels)
            .bind(&details)
            .bind(&zones)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;

            inserted = inserted.saturating_add(result.rows_affected());
        }

        tracing::debug!(
            count = events.len(),
            inserted,
            "Inserted events (batch UNNEST)"
        );
        Ok(inserted)
    }

    /// Fetch one event by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, event_id: EventId) -> Result<Option<GameEventRow>, DbError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM game_events WHERE event_id::TEXT = $1");
        let row = sqlx::query_as::<_, GameEventRow>(&sql)
            .bind(event_id.to_string())
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Most recent events for one player, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn events_for_player(
        &self,
        player: &PlayerId,
        limit: i64,
    ) -> Result<Vec<GameEventRow>, DbError> {
        let sql = format!(
            r#"SELECT {SELECT_COLUMNS}
               FROM game_events
               WHERE player_id = $1
               ORDER BY "timestamp" DESC
               LIMIT $2"#
        );
        let rows = sqlx::query_as::<_, GameEventRow>(&sql)
            .bind(player.as_str())
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Total number of stored events.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM game_events")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

impl EventSink for GameEventStore<'_> {
    type Error = DbError;

    async fn record(&mut self, event: &GameEvent) -> Result<Recorded, DbError> {
        self.insert(event).await
    }
}

/// A row from the `game_events` table.
///
/// Columns are cast to text and 64-bit integers on read, so the row decodes
/// regardless of the exact column types the dashboard schema picked.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameEventRow {
    /// Event identifier.
    pub event_id: String,
    /// When the event happened.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Acting player.
    pub player_id: String,
    /// Event type label.
    pub event_type: String,
    /// Signed score change.
    pub score_change: i64,
    /// Score after the change.
    pub current_score: i64,
    /// Level after the event.
    pub player_level: i64,
    /// JSON payload text.
    pub details: Option<String>,
    /// Zone label.
    pub game_zone: Option<String>,
}
