use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{Player, Role};
use crate::store::StoreError;

use super::{from_text, to_text};

#[derive(FromRow)]
struct PlayerRow {
    id: Uuid,
    game_id: Uuid,
    name: String,
    secret: String,
    role: Option<String>,
    known_player_ids: Vec<Uuid>,
}

impl PlayerRow {
    fn into_domain(self) -> Result<Player, StoreError> {
        Ok(Player {
            id: self.id,
            game_id: self.game_id,
            name: self.name,
            secret: self.secret,
            role: self.role.as_deref().map(from_text::<Role>).transpose()?,
            known_player_ids: self.known_player_ids,
        })
    }
}

pub async fn insert(pool: &PgPool, player: &Player) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO players (id, game_id, name, secret, role, known_player_ids) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(player.id)
    .bind(player.game_id)
    .bind(&player.name)
    .bind(&player.secret)
    .bind(player.role.as_ref().map(to_text).transpose()?)
    .bind(&player.known_player_ids)
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("insert player {}: {e}", player.id)))?;

    Ok(())
}

pub async fn update(pool: &PgPool, player: &Player) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE players SET name = $1, role = $2, known_player_ids = $3 \
         WHERE game_id = $4 AND id = $5",
    )
    .bind(&player.name)
    .bind(player.role.as_ref().map(to_text).transpose()?)
    .bind(&player.known_player_ids)
    .bind(player.game_id)
    .bind(player.id)
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("update player {}: {e}", player.id)))?;

    Ok(())
}

pub async fn find(
    pool: &PgPool,
    game_id: Uuid,
    player_id: Uuid,
) -> Result<Option<Player>, StoreError> {
    let row = sqlx::query_as::<_, PlayerRow>(
        "SELECT * FROM players WHERE game_id = $1 AND id = $2",
    )
    .bind(game_id)
    .bind(player_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch player {player_id}: {e}")))?;

    row.map(PlayerRow::into_domain).transpose()
}

pub async fn find_all(pool: &PgPool, game_id: Uuid) -> Result<Vec<Player>, StoreError> {
    let rows = sqlx::query_as::<_, PlayerRow>("SELECT * FROM players WHERE game_id = $1")
        .bind(game_id)
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("fetch players for {game_id}: {e}")))?;

    rows.into_iter().map(PlayerRow::into_domain).collect()
}
