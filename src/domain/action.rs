use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::role::Role;

/// `type` discriminant of the Action surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    JoinGame,
    StartGame,
    SubmitTeamProposal,
    CastRoundVote,
    CastQuestVote,
    SubmitAssassinationTarget,
}

/// An exogenous player (or admin) action. `payload` is validated and
/// deserialized into the per-type payload structs below by the owning
/// service before anything is persisted or emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub game_id: Uuid,
    pub player_id: Uuid,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub payload: serde_json::Value,
}

impl Action {
    pub fn new(game_id: Uuid, player_id: Uuid, action_type: ActionType, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            player_id,
            action_type,
            payload,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinGamePayload {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartGamePayload {
    pub player_ids: Vec<Uuid>,
    #[serde(default)]
    pub assassination_attempts: Option<u32>,
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
    #[serde(default)]
    pub known_roles: Option<HashMap<Role, Vec<Role>>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTeamProposalPayload {
    pub quest_number: u8,
    pub round_number: u8,
    pub team_member_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastRoundVotePayload {
    pub quest_number: u8,
    pub round_number: u8,
    pub player_id: Uuid,
    pub is_approved: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastQuestVotePayload {
    pub quest_number: u8,
    pub player_id: Uuid,
    pub is_approved: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAssassinationTargetPayload {
    pub target_id: Uuid,
}
