use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::store::StoreError;

#[derive(FromRow)]
struct ConnectionRow {
    player_id: Uuid,
    connection_id: Uuid,
}

pub async fn upsert(
    pool: &PgPool,
    game_id: Uuid,
    player_id: Uuid,
    connection_id: Uuid,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO connections (game_id, player_id, connection_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (game_id, player_id) DO UPDATE SET connection_id = EXCLUDED.connection_id
        "#,
    )
    .bind(game_id)
    .bind(player_id)
    .bind(connection_id)
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("upsert connection for {player_id}: {e}")))?;

    Ok(())
}

pub async fn find(
    pool: &PgPool,
    game_id: Uuid,
    player_id: Uuid,
) -> Result<Option<Uuid>, StoreError> {
    let row: Option<(Uuid,)> = sqlx::query_as(
        "SELECT connection_id FROM connections WHERE game_id = $1 AND player_id = $2",
    )
    .bind(game_id)
    .bind(player_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch connection for {player_id}: {e}")))?;

    Ok(row.map(|(id,)| id))
}

pub async fn find_all(pool: &PgPool, game_id: Uuid) -> Result<Vec<(Uuid, Uuid)>, StoreError> {
    let rows = sqlx::query_as::<_, ConnectionRow>(
        "SELECT player_id, connection_id FROM connections WHERE game_id = $1",
    )
    .bind(game_id)
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch connections for {game_id}: {e}")))?;

    Ok(rows
        .into_iter()
        .map(|r| (r.player_id, r.connection_id))
        .collect())
}
