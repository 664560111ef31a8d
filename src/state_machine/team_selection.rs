use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Action, ActionType};
use crate::errors::CoreError;
use crate::services::quest_service::QuestService;
use crate::services::round_service::RoundService;
use crate::services::ServiceContext;
use crate::state_machine::{GameState, StateName};

pub struct TeamSelectionState;

#[async_trait]
impl GameState for TeamSelectionState {
    fn name(&self) -> StateName {
        StateName::TeamSelection
    }

    async fn handle(&self, ctx: &ServiceContext, action: &Action) -> Result<StateName, CoreError> {
        match action.action_type {
            ActionType::SubmitTeamProposal => {
                RoundService::handle_submit_team_proposal(ctx, action).await?;
                Ok(StateName::RoundVoting)
            }
            other => Err(CoreError::invalid(format!(
                "TeamSelection does not accept {other:?}"
            ))),
        }
    }

    /// If the just-left RoundVoting produced a fifth-round Fail, marks the
    /// current Quest Failed; if that causes a majority, fast-forwards to
    /// EndGame. Otherwise ensures a live Quest and a fresh Round exist.
    async fn on_enter(
        &self,
        ctx: &ServiceContext,
        game_id: Uuid,
    ) -> Result<Option<StateName>, CoreError> {
        let majority_reached = QuestService::handle_on_enter_team_selection(ctx, game_id).await?;
        if majority_reached {
            return Ok(Some(StateName::EndGame));
        }
        Ok(None)
    }
}
