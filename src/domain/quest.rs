use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::vote::VoteResult;

/// The `Quest` entity: one of up to five sequential sub-games. Exactly
/// one Quest exists per `(game_id, quest_number)`; quest N implies quest
/// N-1 completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub game_id: Uuid,
    pub quest_number: u8,
    pub team_member_ids: Vec<Uuid>,
    pub result: Option<VoteResult>,
}

impl Quest {
    pub fn new(game_id: Uuid, quest_number: u8) -> Self {
        Self {
            game_id,
            quest_number,
            team_member_ids: Vec::new(),
            result: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_some()
    }
}

/// One team member's ballot on whether a Quest succeeds. Only castable by a
/// member of that Quest's `team_member_ids`; immutable once cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestVote {
    pub game_id: Uuid,
    pub quest_number: u8,
    pub player_id: Uuid,
    pub result: VoteResult,
}
