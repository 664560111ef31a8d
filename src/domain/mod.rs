//! Core domain entities. Plain data types with no persistence or
//! transport concerns — those live in `store` and `messenger`.

pub mod action;
pub mod config_data;
pub mod connection;
pub mod event;
pub mod game;
pub mod player;
pub mod quest;
pub mod role;
pub mod round;
pub mod vote;

pub use action::{
    Action, ActionType, CastQuestVotePayload, CastRoundVotePayload, JoinGamePayload,
    StartGamePayload, SubmitAssassinationTargetPayload, SubmitTeamProposalPayload,
};
pub use connection::PlayerConnection;
pub use event::{Event, EventType};
pub use game::{Game, GameConfig, GameResult, GameStatus};
pub use player::Player;
pub use quest::{Quest, QuestVote};
pub use role::Role;
pub use round::{Round, RoundVote};
pub use vote::VoteResult;
