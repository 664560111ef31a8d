use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::vote::VoteResult;

/// The `Round` entity: one attempt to assemble and approve a team for a
/// Quest. At most five Rounds per Quest; round N implies round N-1
/// completed-failed within the same quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub game_id: Uuid,
    pub quest_number: u8,
    pub round_number: u8,
    pub leader_id: Uuid,
    pub team_member_ids: Vec<Uuid>,
    pub result: Option<VoteResult>,
}

impl Round {
    pub fn new(game_id: Uuid, quest_number: u8, round_number: u8, leader_id: Uuid) -> Self {
        Self {
            game_id,
            quest_number,
            round_number,
            leader_id,
            team_member_ids: Vec::new(),
            result: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }
}

/// One player's ballot on a Round's team proposal. Immutable once cast;
/// at most one per `(round, player)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundVote {
    pub game_id: Uuid,
    pub quest_number: u8,
    pub round_number: u8,
    pub player_id: Uuid,
    pub result: VoteResult,
}
