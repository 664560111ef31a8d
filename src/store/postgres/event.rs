use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{Event, EventType};
use crate::store::StoreError;

use super::{from_text, to_text};

#[derive(FromRow)]
struct EventRow {
    game_id: Uuid,
    event_id: Uuid,
    event_type: String,
    recipients: Vec<Uuid>,
    payload: sqlx::types::Json<serde_json::Value>,
    timestamp: chrono::DateTime<chrono::Utc>,
}

impl EventRow {
    fn into_domain(self) -> Result<Event, StoreError> {
        Ok(Event {
            game_id: self.game_id,
            event_id: self.event_id,
            event_type: from_text::<EventType>(&self.event_type)?,
            recipients: self.recipients,
            payload: self.payload.0,
            timestamp: self.timestamp,
        })
    }
}

pub async fn insert(pool: &PgPool, event: &Event) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO events (game_id, event_id, event_type, recipients, payload, timestamp) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(event.game_id)
    .bind(event.event_id)
    .bind(to_text(&event.event_type)?)
    .bind(&event.recipients)
    .bind(sqlx::types::Json(&event.payload))
    .bind(event.timestamp)
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("insert event {}: {e}", event.event_id)))?;

    Ok(())
}

/// Visible to `player_id`: public events (`recipients = '{}'`) plus events
/// whose `recipients` array contains `player_id`.
pub async fn find_for_player(
    pool: &PgPool,
    game_id: Uuid,
    player_id: Uuid,
) -> Result<Vec<Event>, StoreError> {
    let rows = sqlx::query_as::<_, EventRow>(
        r#"
        SELECT * FROM events
        WHERE game_id = $1 AND (cardinality(recipients) = 0 OR $2 = ANY(recipients))
        ORDER BY timestamp
        "#,
    )
    .bind(game_id)
    .bind(player_id)
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch events for {game_id}/{player_id}: {e}")))?;

    rows.into_iter().map(EventRow::into_domain).collect()
}
