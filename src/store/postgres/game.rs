use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{Game, GameConfig, GameResult, GameStatus};
use crate::state_machine::StateName;
use crate::store::StoreError;

use super::{from_text, to_text};

#[derive(FromRow)]
struct GameRow {
    id: Uuid,
    status: String,
    state: String,
    config: Option<sqlx::types::Json<GameConfig>>,
    player_ids: Vec<Uuid>,
    leader_id: Option<Uuid>,
    assassination_attempts: Option<i32>,
    result: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl GameRow {
    fn into_domain(self) -> Result<Game, StoreError> {
        Ok(Game {
            id: self.id,
            status: from_text::<GameStatus>(&self.status)?,
            state: from_text::<StateName>(&self.state)?,
            config: self.config.map(|j| j.0),
            player_ids: self.player_ids,
            leader_id: self.leader_id,
            assassination_attempts: self.assassination_attempts.map(|n| n as u32),
            result: self
                .result
                .as_deref()
                .map(from_text::<GameResult>)
                .transpose()?,
            created_at: self.created_at,
        })
    }
}

pub async fn insert(pool: &PgPool, game: &Game) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO games (
            id, status, state, config, player_ids, leader_id,
            assassination_attempts, result, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(game.id)
    .bind(to_text(&game.status)?)
    .bind(to_text(&game.state)?)
    .bind(game.config.as_ref().map(sqlx::types::Json))
    .bind(&game.player_ids)
    .bind(game.leader_id)
    .bind(game.assassination_attempts.map(|n| n as i32))
    .bind(game.result.as_ref().map(to_text).transpose()?)
    .bind(game.created_at)
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("insert game {}: {e}", game.id)))?;

    Ok(())
}

pub async fn find(pool: &PgPool, game_id: Uuid) -> Result<Option<Game>, StoreError> {
    let row = sqlx::query_as::<_, GameRow>("SELECT * FROM games WHERE id = $1")
        .bind(game_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("fetch game {game_id}: {e}")))?;

    row.map(GameRow::into_domain).transpose()
}

/// Optimistic concurrency: the `UPDATE` only matches a row whose persisted
/// `state` still equals `expected_state`; zero rows affected means a
/// concurrent writer already advanced the game, surfaced as a Conflict.
pub async fn update_with_expected_state(
    pool: &PgPool,
    game: &Game,
    expected_state: StateName,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE games SET
            status = $1, state = $2, config = $3, player_ids = $4,
            leader_id = $5, assassination_attempts = $6, result = $7
        WHERE id = $8 AND state = $9
        "#,
    )
    .bind(to_text(&game.status)?)
    .bind(to_text(&game.state)?)
    .bind(game.config.as_ref().map(sqlx::types::Json))
    .bind(&game.player_ids)
    .bind(game.leader_id)
    .bind(game.assassination_attempts.map(|n| n as i32))
    .bind(game.result.as_ref().map(to_text).transpose()?)
    .bind(game.id)
    .bind(to_text(&expected_state)?)
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("update game {}: {e}", game.id)))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::Conflict(format!("game {}", game.id)));
    }

    Ok(())
}
