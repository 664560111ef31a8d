//! Shared black-box dispatch-loop harness for the scenario tests in
//! `tests/dispatch.rs`: an `InMemoryRecordStore` plus a `RecordingMessenger`
//! test double, driven through the real `StateMachine` exactly as a
//! transport adapter would, but without opening a socket.

use std::sync::Arc;

use avalon_core_be::domain::{Action, ActionType, Game, Role};
use avalon_core_be::errors::CoreError;
use avalon_core_be::messenger::recording::RecordingMessenger;
use avalon_core_be::messenger::Messenger;
use avalon_core_be::services::ServiceContext;
use avalon_core_be::state_machine::{StateMachine, StateName};
use avalon_core_be::store::memory::InMemoryRecordStore;
use avalon_core_be::store::RecordStore;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

pub struct Harness {
    pub ctx: ServiceContext,
    pub machine: StateMachine,
    pub messenger: Arc<RecordingMessenger>,
    pub store: Arc<dyn RecordStore>,
    pub game_id: Uuid,
}

impl Harness {
    pub async fn new(seed: u64) -> Self {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let ctx = ServiceContext::with_seed(
            store.clone(),
            messenger.clone() as Arc<dyn Messenger>,
            seed,
        );
        let game_id = Uuid::new_v4();
        store.put_game(Game::new(game_id, Utc::now())).await.unwrap();

        Self {
            ctx,
            machine: StateMachine::new(),
            messenger,
            store,
            game_id,
        }
    }

    pub async fn dispatch(&self, action: Action) -> Result<StateName, CoreError> {
        self.machine.dispatch(&self.ctx, action).await
    }

    /// Dispatches `action`, panicking with context on failure — for the
    /// parts of a scenario that are expected to succeed.
    pub async fn dispatch_ok(&self, action: Action) -> StateName {
        self.dispatch(action.clone())
            .await
            .unwrap_or_else(|e| panic!("expected {:?} to succeed, got {e}", action.action_type))
    }

    pub async fn join(&self, player_id: Uuid, name: &str) -> StateName {
        self.dispatch_ok(Action::new(
            self.game_id,
            player_id,
            ActionType::JoinGame,
            json!({ "name": name }),
        ))
        .await
    }

    pub async fn start_game(&self, player_ids: &[Uuid], roles: Option<Vec<Role>>) -> StateName {
        let mut payload = json!({ "player_ids": player_ids });
        if let Some(roles) = roles {
            payload["roles"] = json!(roles);
        }
        self.dispatch_ok(Action::new(
            self.game_id,
            player_ids[0],
            ActionType::StartGame,
            payload,
        ))
        .await
    }

    pub async fn submit_team_proposal(
        &self,
        leader_id: Uuid,
        quest_number: u8,
        round_number: u8,
        team_member_ids: &[Uuid],
    ) -> StateName {
        self.dispatch_ok(Action::new(
            self.game_id,
            leader_id,
            ActionType::SubmitTeamProposal,
            json!({
                "quest_number": quest_number,
                "round_number": round_number,
                "team_member_ids": team_member_ids,
            }),
        ))
        .await
    }

    pub async fn cast_round_vote(
        &self,
        player_id: Uuid,
        quest_number: u8,
        round_number: u8,
        is_approved: bool,
    ) -> StateName {
        self.dispatch_ok(Action::new(
            self.game_id,
            player_id,
            ActionType::CastRoundVote,
            json!({
                "quest_number": quest_number,
                "round_number": round_number,
                "player_id": player_id,
                "is_approved": is_approved,
            }),
        ))
        .await
    }

    pub async fn cast_quest_vote(&self, player_id: Uuid, quest_number: u8, is_approved: bool) -> StateName {
        self.dispatch_ok(Action::new(
            self.game_id,
            player_id,
            ActionType::CastQuestVote,
            json!({
                "quest_number": quest_number,
                "player_id": player_id,
                "is_approved": is_approved,
            }),
        ))
        .await
    }

    pub async fn submit_assassination_target(&self, assassin_id: Uuid, target_id: Uuid) -> Result<StateName, CoreError> {
        self.dispatch(Action::new(
            self.game_id,
            assassin_id,
            ActionType::SubmitAssassinationTarget,
            json!({ "target_id": target_id }),
        ))
        .await
    }

    /// Runs one full quest's worth of rounds, each with every player voting
    /// the same way on the team proposal, stopping as soon as a round
    /// passes (the quest then proceeds to QuestVoting). Returns the state
    /// after the deciding round.
    pub async fn run_round_until_pass(
        &self,
        players: &[Uuid],
        quest_number: u8,
        round_number: u8,
        team_size: u8,
    ) -> StateName {
        let leader = self.leader_id().await;
        let team: Vec<Uuid> = players.iter().take(team_size as usize).copied().collect();
        self.submit_team_proposal(leader, quest_number, round_number, &team).await;
        let mut state = StateName::RoundVoting;
        for &player in players {
            state = self.cast_round_vote(player, quest_number, round_number, true).await;
        }
        state
    }

    pub async fn leader_id(&self) -> Uuid {
        self.store.get_game(self.game_id).await.unwrap().leader_id.unwrap()
    }

    pub async fn team_size(&self, quest_number: u8) -> u8 {
        let game = self.store.get_game(self.game_id).await.unwrap();
        *game.config.unwrap().quest_team_size.get(&quest_number).unwrap()
    }

    pub async fn role_of(&self, player_id: Uuid) -> Role {
        self.store
            .get_player(self.game_id, player_id)
            .await
            .unwrap()
            .role
            .unwrap()
    }

    pub async fn player_with_role(&self, role: Role) -> Uuid {
        self.store
            .get_players(self.game_id)
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.role == Some(role))
            .unwrap_or_else(|| panic!("no player with role {role:?}"))
            .id
    }

    pub async fn events(&self) -> Vec<Value> {
        self.messenger
            .events()
            .await
            .into_iter()
            .map(|e| json!({ "type": e.event_type, "recipients": e.recipients, "payload": e.payload }))
            .collect()
    }
}

pub async fn join_players(harness: &Harness, count: usize) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = Uuid::new_v4();
        harness.join(id, &format!("player-{i}")).await;
        ids.push(id);
    }
    ids
}
