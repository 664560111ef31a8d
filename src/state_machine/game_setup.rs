use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Action, ActionType};
use crate::errors::CoreError;
use crate::services::game_service::GameService;
use crate::services::player_service::PlayerService;
use crate::services::ServiceContext;
use crate::state_machine::{GameState, StateName};

pub struct GameSetupState;

#[async_trait]
impl GameState for GameSetupState {
    fn name(&self) -> StateName {
        StateName::GameSetup
    }

    async fn handle(&self, ctx: &ServiceContext, action: &Action) -> Result<StateName, CoreError> {
        match action.action_type {
            ActionType::JoinGame => {
                PlayerService::handle_join_game(ctx, action).await?;
                Ok(StateName::GameSetup)
            }
            ActionType::StartGame => {
                GameService::handle_start_game(ctx, action).await?;
                Ok(StateName::TeamSelection)
            }
            other => Err(CoreError::invalid(format!(
                "GameSetup does not accept {other:?}"
            ))),
        }
    }

    async fn on_enter(
        &self,
        _ctx: &ServiceContext,
        _game_id: Uuid,
    ) -> Result<Option<StateName>, CoreError> {
        Ok(None)
    }
}
