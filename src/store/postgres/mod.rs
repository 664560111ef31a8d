//! `PostgresRecordStore`: the production `RecordStore` backed by `sqlx` +
//! Postgres, following a repository-per-entity split. One module per
//! entity holds its row type and queries; this module wires them behind
//! the trait.

mod connection;
mod event;
mod game;
mod player;
mod quest;
mod quest_vote;
mod round;
mod round_vote;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Event, Game, Player, Quest, QuestVote, Round, RoundVote};
use crate::state_machine::StateName;
use crate::store::{RecordStore, StoreError};

/// Enums (`GameStatus`, `StateName`, `Role`, `VoteResult`, `EventType`) are
/// stored as their serde snake_case text form in `TEXT` columns rather than
/// native Postgres enum types, so the schema needs no `CREATE TYPE` migration
/// ahead of a crate upgrade that adds a variant.
fn to_text<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    match serde_json::to_value(value).map_err(|e| StoreError::Backend(e.to_string()))? {
        serde_json::Value::String(s) => Ok(s),
        other => Err(StoreError::Backend(format!(
            "expected string-serializable enum, got {other}"
        ))),
    }
}

fn from_text<T: serde::de::DeserializeOwned>(text: &str) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(text.to_string()))
        .map_err(|e| StoreError::Backend(e.to_string()))
}

pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn put_game(&self, game: Game) -> Result<(), StoreError> {
        game::insert(&self.pool, &game).await
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Game, StoreError> {
        game::find(&self.pool, game_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("game {game_id}")))
    }

    async fn update_game(
        &self,
        game: Game,
        expected_state: StateName,
    ) -> Result<(), StoreError> {
        game::update_with_expected_state(&self.pool, &game, expected_state).await
    }

    async fn put_player(&self, player: Player) -> Result<(), StoreError> {
        player::insert(&self.pool, &player).await
    }

    async fn update_player(&self, player: Player) -> Result<(), StoreError> {
        player::update(&self.pool, &player).await
    }

    async fn get_player(&self, game_id: Uuid, player_id: Uuid) -> Result<Player, StoreError> {
        player::find(&self.pool, game_id, player_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("player {player_id}")))
    }

    async fn get_players(&self, game_id: Uuid) -> Result<Vec<Player>, StoreError> {
        player::find_all(&self.pool, game_id).await
    }

    async fn put_quest(&self, quest: Quest) -> Result<(), StoreError> {
        quest::insert(&self.pool, &quest).await
    }

    async fn update_quest(&self, quest: Quest) -> Result<(), StoreError> {
        quest::update(&self.pool, &quest).await
    }

    async fn get_quest(&self, game_id: Uuid, quest_number: u8) -> Result<Quest, StoreError> {
        quest::find(&self.pool, game_id, quest_number)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("quest {game_id}/{quest_number}")))
    }

    async fn get_quests(&self, game_id: Uuid) -> Result<Vec<Quest>, StoreError> {
        quest::find_all(&self.pool, game_id).await
    }

    async fn put_round(&self, round: Round) -> Result<(), StoreError> {
        round::insert(&self.pool, &round).await
    }

    async fn update_round(&self, round: Round) -> Result<(), StoreError> {
        round::update(&self.pool, &round).await
    }

    async fn get_round(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
    ) -> Result<Round, StoreError> {
        round::find(&self.pool, game_id, quest_number, round_number)
            .await?
            .ok_or_else(|| {
                StoreError::NotFound(format!("round {game_id}/{quest_number}/{round_number}"))
            })
    }

    async fn get_rounds(&self, game_id: Uuid) -> Result<Vec<Round>, StoreError> {
        round::find_all(&self.pool, game_id).await
    }

    async fn put_round_vote(&self, vote: RoundVote) -> Result<(), StoreError> {
        round_vote::insert(&self.pool, &vote).await
    }

    async fn get_round_vote(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
        player_id: Uuid,
    ) -> Result<Option<RoundVote>, StoreError> {
        round_vote::find(&self.pool, game_id, quest_number, round_number, player_id).await
    }

    async fn get_round_votes(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
    ) -> Result<Vec<RoundVote>, StoreError> {
        round_vote::find_all(&self.pool, game_id, quest_number, round_number).await
    }

    async fn put_quest_vote(&self, vote: QuestVote) -> Result<(), StoreError> {
        quest_vote::insert(&self.pool, &vote).await
    }

    async fn get_quest_votes(
        &self,
        game_id: Uuid,
        quest_number: u8,
    ) -> Result<Vec<QuestVote>, StoreError> {
        quest_vote::find_all(&self.pool, game_id, quest_number).await
    }

    async fn put_event(&self, event: Event) -> Result<(), StoreError> {
        event::insert(&self.pool, &event).await
    }

    async fn get_events(&self, game_id: Uuid, player_id: Uuid) -> Result<Vec<Event>, StoreError> {
        event::find_for_player(&self.pool, game_id, player_id).await
    }

    async fn put_connection_id(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        connection_id: Uuid,
    ) -> Result<(), StoreError> {
        connection::upsert(&self.pool, game_id, player_id, connection_id).await
    }

    async fn get_connection_id(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        connection::find(&self.pool, game_id, player_id).await
    }

    async fn get_connection_ids(&self, game_id: Uuid) -> Result<Vec<(Uuid, Uuid)>, StoreError> {
        connection::find_all(&self.pool, game_id).await
    }
}
