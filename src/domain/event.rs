use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every event type the core can emit. The `type` string is part of
/// the public wire protocol — do not rename variants without a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PlayerJoined,
    GameStarted,
    QuestStarted,
    RoundStarted,
    TeamSelectionRequested,
    TeamProposalSubmitted,
    RoundVoteCast,
    RoundCompleted,
    QuestVoteStarted,
    QuestVoteRequested,
    QuestVoteCast,
    QuestCompleted,
    AssassinationStarted,
    AssassinationTargetRequested,
    AssassinationSucceeded,
    AssassinationFailed,
    GameEnded,
}

/// An append-only domain event. `recipients` empty means public
/// (broadcast); otherwise it is a subset of `Game.player_ids` and the
/// event is delivered by `notify` to each recipient individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub game_id: Uuid,
    pub event_id: Uuid,
    pub event_type: EventType,
    pub recipients: Vec<Uuid>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn is_public(&self) -> bool {
        self.recipients.is_empty()
    }
}
