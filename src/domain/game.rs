use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::role::Role;
use crate::state_machine::StateName;

/// `status`: the coarse game lifecycle, independent of
/// which fine-grained `state` the state machine currently owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// Final outcome of a finished game, derived from the majority of quest
/// results and (if reached) the assassination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    GoodWins,
    EvilWins,
}

/// Team sizes, role composition, and visibility table fixed at game start:
/// quest-team-size table keyed by player count, role list, known-roles
/// mapping, assassination attempts. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// quest_number (1..5) -> number of team members required
    pub quest_team_size: HashMap<u8, u8>,
    /// role assigned to player at index i of the shuffled player list
    pub roles: Vec<Role>,
    /// role -> set of roles whose holders are revealed to it at game start
    pub known_roles: HashMap<Role, Vec<Role>>,
    pub assassination_attempts: u32,
}

/// The `Game` entity. Keyed by `game_id`; owns the lifecycle of every
/// other per-game record (Players, Quests, Rounds, votes, Events).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub status: GameStatus,
    pub state: StateName,
    pub config: Option<GameConfig>,
    /// Set once at `StartGame`, in the order submitted by the admin action.
    pub player_ids: Vec<Uuid>,
    /// Cycles deterministically through `player_ids` on each new Round.
    pub leader_id: Option<Uuid>,
    /// Decrements on each `SubmitAssassinationTarget`; initialized from
    /// `config.assassination_attempts` on entering EndGame.
    pub assassination_attempts: Option<u32>,
    pub result: Option<GameResult>,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: GameStatus::NotStarted,
            state: StateName::GameSetup,
            config: None,
            player_ids: Vec::new(),
            leader_id: None,
            assassination_attempts: None,
            result: None,
            created_at: now,
        }
    }
}
