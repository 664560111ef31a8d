//! Round Service: assembling and approving a team for a quest's current
//! round, and rotating the leader seat.

use uuid::Uuid;

use crate::domain::{Action, CastRoundVotePayload, Round, RoundVote, SubmitTeamProposalPayload, VoteResult};
use crate::errors::CoreError;
use crate::services::event_service::EventService;
use crate::services::ServiceContext;

pub struct RoundService;

impl RoundService {
    /// Creates the next Round for `quest_number`: round number one past the
    /// highest existing round in the game, leader rotated one position
    /// through `player_ids` with wraparound. Emits `RoundStarted` and
    /// `TeamSelectionRequested` with the configured team size.
    pub async fn create_round(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
    ) -> Result<Round, CoreError> {
        let rounds = ctx.store.get_rounds(game_id).await?;
        let round_number = rounds
            .iter()
            .filter(|r| r.quest_number == quest_number)
            .map(|r| r.round_number)
            .max()
            .map(|n| n + 1)
            .unwrap_or(1);

        let leader_id = Self::rotate_leader(ctx, game_id).await?;

        let round = Round::new(game_id, quest_number, round_number, leader_id);
        ctx.store.put_round(round.clone()).await?;

        EventService::round_started(ctx, game_id, quest_number, round_number, leader_id).await?;

        let game = ctx.store.get_game(game_id).await?;
        let team_size = game
            .config
            .as_ref()
            .and_then(|c| c.quest_team_size.get(&quest_number))
            .copied()
            .ok_or_else(|| CoreError::invalid(format!("no team size configured for quest {quest_number}")))?;
        EventService::team_selection_requested(ctx, game_id, quest_number, round_number, team_size).await?;

        tracing::debug!(game_id = %game_id, quest_number, round_number, %leader_id, "round created");
        Ok(round)
    }

    async fn rotate_leader(ctx: &ServiceContext, game_id: Uuid) -> Result<Uuid, CoreError> {
        let mut game = ctx.store.get_game(game_id).await?;
        let expected_state = game.state;
        if game.player_ids.is_empty() {
            return Err(CoreError::conflict("game has no players to rotate a leader through"));
        }
        let next_leader_id = match game.leader_id {
            None => game.player_ids[0],
            Some(current) => {
                let idx = game
                    .player_ids
                    .iter()
                    .position(|id| *id == current)
                    .ok_or_else(|| CoreError::conflict("current leader is not among player_ids"))?;
                game.player_ids[(idx + 1) % game.player_ids.len()]
            }
        };
        game.leader_id = Some(next_leader_id);
        ctx.store.update_game(game, expected_state).await?;
        Ok(next_leader_id)
    }

    /// Validates the action originates from the current leader, that
    /// `team_member_ids.len()` equals the configured quest team size, and
    /// that every id is a known player.
    pub async fn handle_submit_team_proposal(ctx: &ServiceContext, action: &Action) -> Result<(), CoreError> {
        let payload: SubmitTeamProposalPayload = serde_json::from_value(action.payload.clone())
            .map_err(|e| CoreError::invalid(format!("malformed SubmitTeamProposal payload: {e}")))?;

        let game = ctx.store.get_game(action.game_id).await?;
        if game.leader_id != Some(action.player_id) {
            return Err(CoreError::invalid("only the current leader may submit a team proposal"));
        }

        let team_size = game
            .config
            .as_ref()
            .and_then(|c| c.quest_team_size.get(&payload.quest_number))
            .copied()
            .ok_or_else(|| CoreError::invalid(format!("no team size configured for quest {}", payload.quest_number)))?;
        if payload.team_member_ids.len() != team_size as usize {
            return Err(CoreError::invalid(format!(
                "team proposal must have {team_size} members, got {}",
                payload.team_member_ids.len()
            )));
        }

        let players = ctx.store.get_players(action.game_id).await?;
        let known_ids: std::collections::HashSet<Uuid> = players.iter().map(|p| p.id).collect();
        if payload.team_member_ids.iter().any(|id| !known_ids.contains(id)) {
            return Err(CoreError::invalid("team proposal contains unknown player ids"));
        }

        let mut round = ctx
            .store
            .get_round(action.game_id, payload.quest_number, payload.round_number)
            .await?;
        round.team_member_ids = payload.team_member_ids.clone();
        ctx.store.update_round(round).await?;

        EventService::team_proposal_submitted(
            ctx,
            action.game_id,
            payload.quest_number,
            payload.round_number,
            &payload.team_member_ids,
        )
        .await
    }

    /// Validates the voter exists, the quest and round are still open, and
    /// no prior vote exists for `(voter, round)`. Persists the vote and
    /// tallies the round once every player has voted.
    pub async fn handle_cast_round_vote(ctx: &ServiceContext, action: &Action) -> Result<(), CoreError> {
        let payload: CastRoundVotePayload = serde_json::from_value(action.payload.clone())
            .map_err(|e| CoreError::invalid(format!("malformed CastRoundVote payload: {e}")))?;

        ctx.store.get_player(action.game_id, payload.player_id).await?;

        let quest = ctx.store.get_quest(action.game_id, payload.quest_number).await?;
        if quest.is_complete() {
            return Err(CoreError::invalid(format!("quest {} already completed", payload.quest_number)));
        }

        let round = ctx
            .store
            .get_round(action.game_id, payload.quest_number, payload.round_number)
            .await?;
        if round.is_complete() {
            return Err(CoreError::invalid(format!("round {} already completed", payload.round_number)));
        }

        let existing = ctx
            .store
            .get_round_vote(action.game_id, payload.quest_number, payload.round_number, payload.player_id)
            .await?;
        if existing.is_some() {
            return Err(CoreError::invalid(format!(
                "player {} already voted for quest {} round {}",
                payload.player_id, payload.quest_number, payload.round_number
            )));
        }

        let result = VoteResult::from_approved(payload.is_approved);
        let vote = RoundVote {
            game_id: action.game_id,
            quest_number: payload.quest_number,
            round_number: payload.round_number,
            player_id: payload.player_id,
            result,
        };
        ctx.store.put_round_vote(vote).await?;
        EventService::round_vote_cast(
            ctx,
            action.game_id,
            payload.quest_number,
            payload.round_number,
            payload.player_id,
            result,
        )
        .await?;

        let players = ctx.store.get_players(action.game_id).await?;
        let votes = ctx
            .store
            .get_round_votes(action.game_id, payload.quest_number, payload.round_number)
            .await?;
        if votes.len() < players.len() {
            return Ok(());
        }

        let approved = votes.iter().filter(|v| v.result.is_pass()).count();
        let round_result = if approved * 2 > votes.len() {
            VoteResult::Pass
        } else {
            VoteResult::Fail
        };

        let mut round = round;
        round.result = Some(round_result);
        ctx.store.update_round(round).await?;
        EventService::round_completed(ctx, action.game_id, payload.quest_number, payload.round_number, round_result)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{Game, GameConfig, GameStatus};
    use crate::messenger::recording::RecordingMessenger;
    use crate::messenger::Messenger;
    use crate::store::memory::InMemoryRecordStore;
    use crate::store::RecordStore;

    /// Leader rotates one position through `player_ids` with wraparound on
    /// each new Round, regardless of quest boundaries.
    #[tokio::test]
    async fn leader_rotates_one_step_with_wraparound_across_rounds() {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let messenger: Arc<dyn Messenger> = Arc::new(RecordingMessenger::new());
        let ctx = ServiceContext::with_seed(store.clone(), messenger, 0);

        let game_id = Uuid::new_v4();
        let player_ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        let mut game = Game::new(game_id, Utc::now());
        game.status = GameStatus::InProgress;
        game.player_ids = player_ids.clone();
        game.config = Some(GameConfig {
            quest_team_size: HashMap::from([(1, 2), (2, 3)]),
            roles: Vec::new(),
            known_roles: HashMap::new(),
            assassination_attempts: 1,
        });
        store.put_game(game).await.unwrap();

        let mut leaders = Vec::new();
        for quest_number in [1, 1, 1, 2] {
            let round = RoundService::create_round(&ctx, game_id, quest_number).await.unwrap();
            leaders.push(round.leader_id);
        }

        for (i, &leader) in leaders.iter().enumerate() {
            let expected = player_ids[i % player_ids.len()];
            assert_eq!(leader, expected, "round {i} should be led by player {i} in rotation order");
        }
    }
}
