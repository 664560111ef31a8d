use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Action, ActionType, VoteResult};
use crate::errors::CoreError;
use crate::services::round_service::RoundService;
use crate::services::ServiceContext;
use crate::state_machine::{GameState, StateName};

pub struct RoundVotingState;

#[async_trait]
impl GameState for RoundVotingState {
    fn name(&self) -> StateName {
        StateName::RoundVoting
    }

    /// round not complete → self; round Pass → QuestVoting; round Fail →
    /// TeamSelection.
    async fn handle(&self, ctx: &ServiceContext, action: &Action) -> Result<StateName, CoreError> {
        match action.action_type {
            ActionType::CastRoundVote => {
                RoundService::handle_cast_round_vote(ctx, action).await?;

                let payload: crate::domain::CastRoundVotePayload =
                    serde_json::from_value(action.payload.clone())
                        .map_err(|e| CoreError::invalid(format!("malformed CastRoundVote payload: {e}")))?;
                let round = ctx
                    .store
                    .get_round(action.game_id, payload.quest_number, payload.round_number)
                    .await?;

                match round.result {
                    None => Ok(StateName::RoundVoting),
                    Some(VoteResult::Pass) => Ok(StateName::QuestVoting),
                    Some(VoteResult::Fail) => Ok(StateName::TeamSelection),
                }
            }
            other => Err(CoreError::invalid(format!(
                "RoundVoting does not accept {other:?}"
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
