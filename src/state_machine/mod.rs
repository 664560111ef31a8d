//! The State Machine: dispatches Actions to the state that owns them,
//! applies on-exit/on-enter hooks, persists the new state, and re-enters if
//! on-enter returns a fast-forward target.

mod end_game;
mod game_setup;
mod quest_voting;
mod round_voting;
mod team_selection;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Action;
use crate::errors::CoreError;
use crate::services::ServiceContext;

/// The five game states. Persisted on `Game.state` as a tag only — never
/// as a reference to another state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateName {
    GameSetup,
    TeamSelection,
    RoundVoting,
    QuestVoting,
    EndGame,
}

/// A single state's behavior. States never hold references to each other;
/// the only state conveyed between them is the `StateName` tag on `Game`.
#[async_trait]
pub trait GameState: Send + Sync {
    fn name(&self) -> StateName;

    /// Validates `action` is one this state accepts and performs it,
    /// returning the `StateName` to persist as the new current state.
    async fn handle(
        &self,
        ctx: &ServiceContext,
        action: &Action,
    ) -> Result<StateName, CoreError>;

    /// Runs once when the state machine transitions into this state.
    /// Returning `Some(next)` instructs the dispatch loop to immediately
    /// exit this state and enter `next` without waiting for another Action
    /// (the "fast-forward" rule).
    async fn on_enter(
        &self,
        ctx: &ServiceContext,
        game_id: Uuid,
    ) -> Result<Option<StateName>, CoreError>;

    /// Runs once when the state machine transitions out of this state.
    async fn on_exit(&self, ctx: &ServiceContext, game_id: Uuid) -> Result<(), CoreError> {
        let _ = (ctx, game_id);
        Ok(())
    }
}

/// Flat `state_tag -> handler` table, built once at service start. The
/// `Game` record only ever stores the `StateName` tag, so this
/// table can be rebuilt freely without migrating persisted data.
pub fn build_state_table() -> HashMap<StateName, Box<dyn GameState>> {
    let mut table: HashMap<StateName, Box<dyn GameState>> = HashMap::new();
    table.insert(StateName::GameSetup, Box::new(game_setup::GameSetupState));
    table.insert(
        StateName::TeamSelection,
        Box::new(team_selection::TeamSelectionState),
    );
    table.insert(
        StateName::RoundVoting,
        Box::new(round_voting::RoundVotingState),
    );
    table.insert(
        StateName::QuestVoting,
        Box::new(quest_voting::QuestVotingState),
    );
    table.insert(StateName::EndGame, Box::new(end_game::EndGameState));
    table
}

/// Dispatches one Action through the state machine: loads the current
/// state from the persisted `Game.state`, delegates to its
/// `handle`, then runs `on_exit`/`on_enter` for the transition, applying at
/// most one fast-forward substitution, and finally persists the new state as
/// the last step of a successful dispatch.
pub struct StateMachine {
    states: HashMap<StateName, Box<dyn GameState>>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            states: build_state_table(),
        }
    }

    fn state(&self, name: StateName) -> &dyn GameState {
        self.states
            .get(&name)
            .map(|b| b.as_ref())
            .expect("state table covers every StateName variant")
    }

    pub async fn dispatch(
        &self,
        ctx: &ServiceContext,
        action: Action,
    ) -> Result<StateName, CoreError> {
        let game = ctx.store.get_game(action.game_id).await?;
        let current = self.state(game.state);
        let next = current.handle(ctx, &action).await?;

        if next == game.state {
            return Ok(next);
        }

        current.on_exit(ctx, action.game_id).await?;

        // Entering `next` may itself request a fast-forward (e.g. TeamSelection's
        // on_enter marking the current Quest Failed and discovering a majority).
        // At most one such substitution is honored, and the substituted state's
        // own on_enter runs exactly once — otherwise a state like EndGame could
        // be persisted without ever running the side effects that announce it.
        let target = match self.state(next).on_enter(ctx, action.game_id).await? {
            Some(fast_forward) => {
                self.state(fast_forward).on_enter(ctx, action.game_id).await?;
                fast_forward
            }
            None => next,
        };

        let mut game = ctx.store.get_game(action.game_id).await?;
        let expected = game.state;
        game.state = target;
        ctx.store.update_game(game, expected).await?;

        Ok(target)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
