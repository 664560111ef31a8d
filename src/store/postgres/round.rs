use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{Round, VoteResult};
use crate::store::StoreError;

use super::{from_text, to_text};

#[derive(FromRow)]
struct RoundRow {
    game_id: Uuid,
    quest_number: i16,
    round_number: i16,
    leader_id: Uuid,
    team_member_ids: Vec<Uuid>,
    result: Option<String>,
}

impl RoundRow {
    fn into_domain(self) -> Result<Round, StoreError> {
        Ok(Round {
            game_id: self.game_id,
            quest_number: self.quest_number as u8,
            round_number: self.round_number as u8,
            leader_id: self.leader_id,
            team_member_ids: self.team_member_ids,
            result: self
                .result
                .as_deref()
                .map(from_text::<VoteResult>)
                .transpose()?,
        })
    }
}

pub async fn insert(pool: &PgPool, round: &Round) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO rounds (game_id, quest_number, round_number, leader_id, team_member_ids, result) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(round.game_id)
    .bind(round.quest_number as i16)
    .bind(round.round_number as i16)
    .bind(round.leader_id)
    .bind(&round.team_member_ids)
    .bind(round.result.as_ref().map(to_text).transpose()?)
    .execute(pool)
    .await
    .map_err(|e| {
        StoreError::Backend(format!(
            "insert round {}/{}/{}: {e}",
            round.game_id, round.quest_number, round.round_number
        ))
    })?;

    Ok(())
}

pub async fn update(pool: &PgPool, round: &Round) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE rounds SET team_member_ids = $1, result = $2 \
         WHERE game_id = $3 AND quest_number = $4 AND round_number = $5",
    )
    .bind(&round.team_member_ids)
    .bind(round.result.as_ref().map(to_text).transpose()?)
    .bind(round.game_id)
    .bind(round.quest_number as i16)
    .bind(round.round_number as i16)
    .execute(pool)
    .await
    .map_err(|e| {
        StoreError::Backend(format!(
            "update round {}/{}/{}: {e}",
            round.game_id, round.quest_number, round.round_number
        ))
    })?;

    Ok(())
}

pub async fn find(
    pool: &PgPool,
    game_id: Uuid,
    quest_number: u8,
    round_number: u8,
) -> Result<Option<Round>, StoreError> {
    let row = sqlx::query_as::<_, RoundRow>(
        "SELECT * FROM rounds WHERE game_id = $1 AND quest_number = $2 AND round_number = $3",
    )
    .bind(game_id)
    .bind(quest_number as i16)
    .bind(round_number as i16)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        StoreError::Backend(format!(
            "fetch round {game_id}/{quest_number}/{round_number}: {e}"
        ))
    })?;

    row.map(RoundRow::into_domain).transpose()
}

pub async fn find_all(pool: &PgPool, game_id: Uuid) -> Result<Vec<Round>, StoreError> {
    let rows = sqlx::query_as::<_, RoundRow>(
        "SELECT * FROM rounds WHERE game_id = $1 ORDER BY quest_number, round_number",
    )
    .bind(game_id)
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch rounds for {game_id}: {e}")))?;

    rows.into_iter().map(RoundRow::into_domain).collect()
}
