use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{Quest, VoteResult};
use crate::store::StoreError;

use super::{from_text, to_text};

#[derive(FromRow)]
struct QuestRow {
    game_id: Uuid,
    quest_number: i16,
    team_member_ids: Vec<Uuid>,
    result: Option<String>,
}

impl QuestRow {
    fn into_domain(self) -> Result<Quest, StoreError> {
        Ok(Quest {
            game_id: self.game_id,
            quest_number: self.quest_number as u8,
            team_member_ids: self.team_member_ids,
            result: self
                .result
                .as_deref()
                .map(from_text::<VoteResult>)
                .transpose()?,
        })
    }
}

pub async fn insert(pool: &PgPool, quest: &Quest) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO quests (game_id, quest_number, team_member_ids, result) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(quest.game_id)
    .bind(quest.quest_number as i16)
    .bind(&quest.team_member_ids)
    .bind(quest.result.as_ref().map(to_text).transpose()?)
    .execute(pool)
    .await
    .map_err(|e| {
        StoreError::Backend(format!(
            "insert quest {}/{}: {e}",
            quest.game_id, quest.quest_number
        ))
    })?;

    Ok(())
}

pub async fn update(pool: &PgPool, quest: &Quest) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE quests SET team_member_ids = $1, result = $2 \
         WHERE game_id = $3 AND quest_number = $4",
    )
    .bind(&quest.team_member_ids)
    .bind(quest.result.as_ref().map(to_text).transpose()?)
    .bind(quest.game_id)
    .bind(quest.quest_number as i16)
    .execute(pool)
    .await
    .map_err(|e| {
        StoreError::Backend(format!(
            "update quest {}/{}: {e}",
            quest.game_id, quest.quest_number
        ))
    })?;

    Ok(())
}

pub async fn find(
    pool: &PgPool,
    game_id: Uuid,
    quest_number: u8,
) -> Result<Option<Quest>, StoreError> {
    let row = sqlx::query_as::<_, QuestRow>(
        "SELECT * FROM quests WHERE game_id = $1 AND quest_number = $2",
    )
    .bind(game_id)
    .bind(quest_number as i16)
    .fetch_optional(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch quest {game_id}/{quest_number}: {e}")))?;

    row.map(QuestRow::into_domain).transpose()
}

pub async fn find_all(pool: &PgPool, game_id: Uuid) -> Result<Vec<Quest>, StoreError> {
    let rows = sqlx::query_as::<_, QuestRow>(
        "SELECT * FROM quests WHERE game_id = $1 ORDER BY quest_number",
    )
    .bind(game_id)
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch quests for {game_id}: {e}")))?;

    rows.into_iter().map(QuestRow::into_domain).collect()
}
