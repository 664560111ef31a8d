//! `InMemoryRecordStore`: a `tokio::sync::Mutex`-guarded in-process
//! implementation of [`RecordStore`], used by the crate's own test suite
//! and suitable as a single-process deployment backend.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{Event, Game, Player, Quest, QuestVote, Round, RoundVote};
use crate::state_machine::StateName;
use crate::store::{RecordStore, StoreError};

#[derive(Default)]
struct Tables {
    games: HashMap<Uuid, Game>,
    players: HashMap<(Uuid, Uuid), Player>,
    quests: HashMap<(Uuid, u8), Quest>,
    rounds: HashMap<(Uuid, u8, u8), Round>,
    round_votes: HashMap<(Uuid, u8, u8, Uuid), RoundVote>,
    quest_votes: HashMap<(Uuid, u8, Uuid), QuestVote>,
    events: HashMap<(Uuid, Uuid), Event>,
    connections: HashMap<(Uuid, Uuid), Uuid>,
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: Mutex<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn put_game(&self, game: Game) -> Result<(), StoreError> {
        self.tables.lock().await.games.insert(game.id, game);
        Ok(())
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Game, StoreError> {
        self.tables
            .lock()
            .await
            .games
            .get(&game_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("game {game_id}")))
    }

    async fn update_game(
        &self,
        game: Game,
        expected_state: StateName,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let current = tables
            .games
            .get(&game.id)
            .ok_or_else(|| StoreError::NotFound(format!("game {}", game.id)))?;
        if current.state != expected_state {
            return Err(StoreError::Conflict(format!("game {}", game.id)));
        }
        tables.games.insert(game.id, game);
        Ok(())
    }

    async fn put_player(&self, player: Player) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.players.insert((player.game_id, player.id), player);
        Ok(())
    }

    async fn update_player(&self, player: Player) -> Result<(), StoreError> {
        self.put_player(player).await
    }

    async fn get_player(&self, game_id: Uuid, player_id: Uuid) -> Result<Player, StoreError> {
        self.tables
            .lock()
            .await
            .players
            .get(&(game_id, player_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("player {player_id}")))
    }

    async fn get_players(&self, game_id: Uuid) -> Result<Vec<Player>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .players
            .values()
            .filter(|p| p.game_id == game_id)
            .cloned()
            .collect())
    }

    async fn put_quest(&self, quest: Quest) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables
            .quests
            .insert((quest.game_id, quest.quest_number), quest);
        Ok(())
    }

    async fn update_quest(&self, quest: Quest) -> Result<(), StoreError> {
        self.put_quest(quest).await
    }

    async fn get_quest(&self, game_id: Uuid, quest_number: u8) -> Result<Quest, StoreError> {
        self.tables
            .lock()
            .await
            .quests
            .get(&(game_id, quest_number))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("quest {game_id}/{quest_number}")))
    }

    async fn get_quests(&self, game_id: Uuid) -> Result<Vec<Quest>, StoreError> {
        let mut quests: Vec<Quest> = self
            .tables
            .lock()
            .await
            .quests
            .values()
            .filter(|q| q.game_id == game_id)
            .cloned()
            .collect();
        quests.sort_by_key(|q| q.quest_number);
        Ok(quests)
    }

    async fn put_round(&self, round: Round) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.rounds.insert(
            (round.game_id, round.quest_number, round.round_number),
            round,
        );
        Ok(())
    }

    async fn update_round(&self, round: Round) -> Result<(), StoreError> {
        self.put_round(round).await
    }

    async fn get_round(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
    ) -> Result<Round, StoreError> {
        self.tables
            .lock()
            .await
            .rounds
            .get(&(game_id, quest_number, round_number))
            .cloned()
            .ok_or_else(|| {
                StoreError::NotFound(format!("round {game_id}/{quest_number}/{round_number}"))
            })
    }

    async fn get_rounds(&self, game_id: Uuid) -> Result<Vec<Round>, StoreError> {
        let mut rounds: Vec<Round> = self
            .tables
            .lock()
            .await
            .rounds
            .values()
            .filter(|r| r.game_id == game_id)
            .cloned()
            .collect();
        rounds.sort_by_key(|r| (r.quest_number, r.round_number));
        Ok(rounds)
    }

    async fn put_round_vote(&self, vote: RoundVote) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.round_votes.insert(
            (
                vote.game_id,
                vote.quest_number,
                vote.round_number,
                vote.player_id,
            ),
            vote,
        );
        Ok(())
    }

    async fn get_round_vote(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
        player_id: Uuid,
    ) -> Result<Option<RoundVote>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .round_votes
            .get(&(game_id, quest_number, round_number, player_id))
            .cloned())
    }

    async fn get_round_votes(
        &self,
        game_id: Uuid,
        quest_number: u8,
        round_number: u8,
    ) -> Result<Vec<RoundVote>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .round_votes
            .values()
            .filter(|v| {
                v.game_id == game_id
                    && v.quest_number == quest_number
                    && v.round_number == round_number
            })
            .cloned()
            .collect())
    }

    async fn put_quest_vote(&self, vote: QuestVote) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables
            .quest_votes
            .insert((vote.game_id, vote.quest_number, vote.player_id), vote);
        Ok(())
    }

    async fn get_quest_votes(
        &self,
        game_id: Uuid,
        quest_number: u8,
    ) -> Result<Vec<QuestVote>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .quest_votes
            .values()
            .filter(|v| v.game_id == game_id && v.quest_number == quest_number)
            .cloned()
            .collect())
    }

    async fn put_event(&self, event: Event) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        tables.events.insert((event.game_id, event.event_id), event);
        Ok(())
    }

    async fn get_events(&self, game_id: Uuid, player_id: Uuid) -> Result<Vec<Event>, StoreError> {
        let mut events: Vec<Event> = self
            .tables
            .lock()
            .await
            .events
            .values()
            .filter(|e| {
                e.game_id == game_id && (e.is_public() || e.recipients.contains(&player_id))
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    async fn put_connection_id(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        connection_id: Uuid,
    ) -> Result<(), StoreError> {
        self.tables
            .lock()
            .await
            .connections
            .insert((game_id, player_id), connection_id);
        Ok(())
    }

    async fn get_connection_id(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> Result<Option<Uuid>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .connections
            .get(&(game_id, player_id))
            .copied())
    }

    async fn get_connection_ids(&self, game_id: Uuid) -> Result<Vec<(Uuid, Uuid)>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .connections
            .iter()
            .filter(|((g, _), _)| *g == game_id)
            .map(|((_, player_id), conn_id)| (*player_id, *conn_id))
            .collect())
    }
}
