use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Action, ActionType, GameResult, GameStatus};
use crate::errors::CoreError;
use crate::services::game_service::GameService;
use crate::services::ServiceContext;
use crate::state_machine::{GameState, StateName};

pub struct EndGameState;

#[async_trait]
impl GameState for EndGameState {
    fn name(&self) -> StateName {
        StateName::EndGame
    }

    /// game finished → terminal (stays EndGame, no further action accepted
    /// in practice since `status = Finished`); else → self. A miss with
    /// attempts remaining is also a same-state transition, so
    /// `handle_submit_assassination_target` re-emits
    /// `AssassinationTargetRequested` itself rather than relying on
    /// `on_enter`, which only runs on an actual state change.
    async fn handle(&self, ctx: &ServiceContext, action: &Action) -> Result<StateName, CoreError> {
        match action.action_type {
            ActionType::SubmitAssassinationTarget => {
                let game = ctx.store.get_game(action.game_id).await?;
                if game.status == GameStatus::Finished {
                    return Err(CoreError::conflict("game has already ended"));
                }
                GameService::handle_submit_assassination_target(ctx, action).await?;
                Ok(StateName::EndGame)
            }
            other => Err(CoreError::invalid(format!(
                "EndGame does not accept {other:?}"
            ))),
        }
    }

    /// If no assassination attempts remain, immediately ends the game;
    /// otherwise invokes `on_enter_end_game`. Reached from either a Good or
    /// an Evil quest majority alike — the game's final result is decided
    /// solely by the assassination outcome: a three-Fail quest majority
    /// still runs the assassination phase, and a missed shot still ends
    /// the game with Good as the winner.
    async fn on_enter(
        &self,
        ctx: &ServiceContext,
        game_id: Uuid,
    ) -> Result<Option<StateName>, CoreError> {
        let game = ctx.store.get_game(game_id).await?;
        let attempts = game
            .assassination_attempts
            .or_else(|| game.config.as_ref().map(|c| c.assassination_attempts))
            .unwrap_or(0);

        if attempts == 0 {
            GameService::end_game(ctx, game_id, GameResult::GoodWins).await?;
            return Ok(None);
        }

        GameService::on_enter_end_game(ctx, game_id).await?;
        Ok(None)
    }
}
