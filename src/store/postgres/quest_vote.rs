use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::{QuestVote, VoteResult};
use crate::store::StoreError;

use super::{from_text, to_text};

#[derive(FromRow)]
struct QuestVoteRow {
    game_id: Uuid,
    quest_number: i16,
    player_id: Uuid,
    result: String,
}

impl QuestVoteRow {
    fn into_domain(self) -> Result<QuestVote, StoreError> {
        Ok(QuestVote {
            game_id: self.game_id,
            quest_number: self.quest_number as u8,
            player_id: self.player_id,
            result: from_text::<VoteResult>(&self.result)?,
        })
    }
}

pub async fn insert(pool: &PgPool, vote: &QuestVote) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO quest_votes (game_id, quest_number, player_id, result) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(vote.game_id)
    .bind(vote.quest_number as i16)
    .bind(vote.player_id)
    .bind(to_text(&vote.result)?)
    .execute(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("insert quest vote: {e}")))?;

    Ok(())
}

pub async fn find_all(
    pool: &PgPool,
    game_id: Uuid,
    quest_number: u8,
) -> Result<Vec<QuestVote>, StoreError> {
    let rows = sqlx::query_as::<_, QuestVoteRow>(
        "SELECT * FROM quest_votes WHERE game_id = $1 AND quest_number = $2",
    )
    .bind(game_id)
    .bind(quest_number as i16)
    .fetch_all(pool)
    .await
    .map_err(|e| StoreError::Backend(format!("fetch quest votes: {e}")))?;

    rows.into_iter().map(QuestVoteRow::into_domain).collect()
}
