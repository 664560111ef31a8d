use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Action, ActionType};
use crate::errors::CoreError;
use crate::services::quest_service::QuestService;
use crate::services::ServiceContext;
use crate::state_machine::{GameState, StateName};

pub struct QuestVotingState;

#[async_trait]
impl GameState for QuestVotingState {
    fn name(&self) -> StateName {
        StateName::QuestVoting
    }

    /// quest not complete → self; majority now exists → EndGame; else →
    /// TeamSelection.
    async fn handle(&self, ctx: &ServiceContext, action: &Action) -> Result<StateName, CoreError> {
        match action.action_type {
            ActionType::CastQuestVote => {
                QuestService::handle_cast_quest_vote(ctx, action).await?;

                let payload: crate::domain::CastQuestVotePayload =
                    serde_json::from_value(action.payload.clone())
                        .map_err(|e| CoreError::invalid(format!("malformed CastQuestVote payload: {e}")))?;
                let quest = ctx.store.get_quest(action.game_id, payload.quest_number).await?;

                if !quest.is_complete() {
                    return Ok(StateName::QuestVoting);
                }
                if QuestService::has_majority(ctx, action.game_id).await? {
                    Ok(StateName::EndGame)
                } else {
                    Ok(StateName::TeamSelection)
                }
            }
            other => Err(CoreError::invalid(format!(
                "QuestVoting does not accept {other:?}"
            ))),
        }
    }

    /// Starts quest voting: emits `QuestVoteStarted` (public) and
    /// `QuestVoteRequested` (to each team member).
    async fn on_enter(
        &self,
        ctx: &ServiceContext,
        game_id: Uuid,
    ) -> Result<Option<StateName>, CoreError> {
        QuestService::on_enter_quest_voting(ctx, game_id).await?;
        Ok(None)
    }
}
