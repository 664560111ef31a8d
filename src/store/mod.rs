//! The Record Store contract: a keyed store offering atomic put/get/update
//! over the core entities, queryable by prefix. Two implementations exist:
//! [`memory::InMemoryRecordStore`] for tests and single-process
//! deployments, and [`postgres::PostgresRecordStore`] for production, each
//! following a repository-per-entity split.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Event, Game, Player, Quest, QuestVote, Round, RoundVote};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("conflict updating {0}: expected state did not match")]
    Conflict(String),

    #[error("record store backend error: {0}")]
    Backend(String),
}

/// One method per entity operation. Implementations must provide
/// atomic single-record update (optimistic concurrency on `Game.state` is
/// the minimum required for `update_game`) and prefix range queries scoped
/// to `game_id`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_game(&self, game: Game) -> Result<(), StoreError>;
    async fn get_game(&self, game_id: Uuid) -> Result<Game, StoreError>;
    /// Conditional update: succeeds only if the stored game's `state`
    /// equals `expected_state`, else returns `StoreError::Conflict`.
    async fn update_game(
        &self,
        game: Game,
        expected_state: crate::state_machine::StateName,
    ) -> Result<(), StoreError>;

    async fn put_player(&self, player: Player) -> Result<(), StoreError>;
    async fn update_player(&self, player: Player) -> Result<(), StoreError>;
    async fn get_player(&self, game_id: Uuid, player_id: Uuid) -> Result<Player, StoreError>;
    async fn get_players(&self, game_id: Uuid) -> Result<Vec<Player>, StoreError>;

    async fn put_quest(&self, quest: Quest) -> Result<(), StoreError>;
    async fn update_quest(&self, quest: Quest) -> Result<(), StoreError>;
    async fn get_quest(&self, game_id: Uuid, quest_number: u8) -> Result<Quest, StoreError>;
    async fn get_quests(&self, game_id: Uuid) -> Result<Vec<Quest>, StoreError>;

    async fn put_round(&self, round: Round) -> Result<(), StoreError>;
    async fn update_round(&self, round: Round) -> Result<(), StoreError>;
    async fn get_round(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
    ) -> Result<Round, StoreError>;
    async fn get_rounds(&self, game_id: Uuid) -> Result<Vec<Round>, StoreError>;

    async fn put_round_vote(&self, vote: RoundVote) -> Result<(), StoreError>;
    async fn get_round_vote(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
        player_id: Uuid,
    ) -> Result<Option<RoundVote>, StoreError>;
    async fn get_round_votes(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
    ) -> Result<Vec<RoundVote>, StoreError>;

    async fn put_quest_vote(&self, vote: QuestVote) -> Result<(), StoreError>;
    async fn get_quest_votes(
        &self,
        game_id: Uuid,
        quest_number: u8,
    ) -> Result<Vec<QuestVote>, StoreError>;

    async fn put_event(&self, event: Event) -> Result<(), StoreError>;
    /// Events visible to `player_id`: public events (`recipients` empty) plus
    /// any event whose `recipients` contains `player_id`.
    async fn get_events(&self, game_id: Uuid, player_id: Uuid) -> Result<Vec<Event>, StoreError>;

    async fn put_connection_id(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        connection_id: Uuid,
    ) -> Result<(), StoreError>;
    async fn get_connection_id(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError>;
    async fn get_connection_ids(&self, game_id: Uuid) -> Result<Vec<(Uuid, Uuid)>, StoreError>;
}
