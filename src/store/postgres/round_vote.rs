use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{RoundVote, VoteResult};
use crate::store::StoreError;

use super::{from_text, to_text};

#[derive(FromRow)]
struct RoundVoteRow {
    game_id: Uuid,
    quest_number: i16,
    round_number: i16,
    player_id: Uuid,
    result: String,
}

impl RoundVoteRow {
    fn into_domain(self) -> Result<RoundVote, StoreError> {
        Ok(RoundVote {
            game_id: self.game_id,
            quest_number: self.quest_number as u8,
            round_number: self.round_number as u8,
            player_id: self.player_id,
            result: from_text::<VoteResult>(&self.result)?,
        })
    }
}

pub async fn insert(pool: &PgPool, vote: &RoundVote) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO round_votes (game_id, quest_number, round_number, player_id, result) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(vote.game_id)
    .bind(vote.quest_number as i16)
    .bind(vote.round_number as i16)
    .bind(vote.player_id)
    .bind(to_text(&vote.result)?)
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("insert round vote: {e}")))?;

    Ok(())
}

pub async fn find(
    pool: &PgPool,
    game_id: Uuid,
    quest_number: u8,
    round_number: u8,
    player_id: Uuid,
) -> Result<Option<RoundVote>, StoreError> {
    let row = sqlx::query_as::<_, RoundVoteRow>(
        "SELECT * FROM round_votes WHERE game_id = $1 AND quest_number = $2 \
         AND round_number = $3 AND player_id = $4",
    )
    .bind(game_id)
    .bind(quest_number as i16)
    .bind(round_number as i16)
    .bind(player_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch round vote: {e}")))?;

    row.map(RoundVoteRow::into_domain).transpose()
}

pub async fn find_all(
    pool: &PgPool,
    game_id: Uuid,
    quest_number: u8,
    round_number: u8,
) -> Result<Vec<RoundVote>, StoreError> {
    let rows = sqlx::query_as::<_, RoundVoteRow>(
        "SELECT * FROM round_votes WHERE game_id = $1 AND quest_number = $2 AND round_number = $3",
    )
    .bind(game_id)
    .bind(quest_number as i16)
    .bind(round_number as i16)
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch round votes: {e}")))?;

    rows.into_iter().map(RoundVoteRow::into_domain).collect()
}
