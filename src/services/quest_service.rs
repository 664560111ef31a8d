//! Quest Service: tallying quest votes and the fifth-quest-two-fail
//! tolerance, scoped precisely to `num_players == 10 && quest_number == 5`
//! rather than to every quest but the fourth.

use uuid::Uuid;

use crate::domain::{Action, CastQuestVotePayload, Quest, QuestVote, VoteResult};
use crate::errors::CoreError;
use crate::services::event_service::EventService;
use crate::services::game_service::GameService;
use crate::services::round_service::RoundService;
use crate::services::ServiceContext;

pub struct QuestService;

impl QuestService {
    /// Number of Fail votes a quest's outcome tolerates and still Passes.
    fn fail_tolerance(num_players: usize, quest_number: u8) -> usize {
        if num_players == 10 && quest_number == 5 {
            1
        } else {
            0
        }
    }

    async fn current_quest(ctx: &ServiceContext, game_id: Uuid) -> Result<Option<Quest>, CoreError> {
        let mut quests = ctx.store.get_quests(game_id).await?;
        quests.sort_by_key(|q| q.quest_number);
        Ok(quests.into_iter().next_back())
    }

    pub async fn create_quest(ctx: &ServiceContext, game_id: Uuid) -> Result<Quest, CoreError> {
        let quest_number = Self::current_quest(ctx, game_id)
            .await?
            .map(|q| q.quest_number + 1)
            .unwrap_or(1);

        let quest = Quest::new(game_id, quest_number);
        ctx.store.put_quest(quest.clone()).await?;
        EventService::quest_started(ctx, game_id, quest_number).await?;
        Ok(quest)
    }

    /// If the current Quest is absent or already completed, creates a new
    /// one; otherwise checks whether the just-failed fifth round of the
    /// current quest should auto-fail it. Then instructs Round Service to
    /// create the next Round. Returns `true` if a majority was reached and
    /// the state machine should fast-forward to EndGame.
    pub async fn handle_on_enter_team_selection(ctx: &ServiceContext, game_id: Uuid) -> Result<bool, CoreError> {
        let current = Self::current_quest(ctx, game_id).await?;

        let quest = match current {
            Some(q) if !q.is_complete() => q,
            _ => Self::create_quest(ctx, game_id).await?,
        };

        if !quest.is_complete() {
            let rounds = ctx.store.get_rounds(game_id).await?;
            let last_round_for_quest = rounds
                .into_iter()
                .filter(|r| r.quest_number == quest.quest_number)
                .max_by_key(|r| r.round_number);

            if let Some(round) = last_round_for_quest {
                if round.round_number == 5 && round.result == Some(VoteResult::Fail) {
                    Self::complete_quest(ctx, game_id, quest.quest_number, VoteResult::Fail).await?;
                    return Ok(Self::has_majority(ctx, game_id).await?);
                }
            }
        }

        RoundService::create_round(ctx, game_id, quest.quest_number).await?;
        Ok(false)
    }

    /// Copies the approved Round's team onto the Quest record — only these
    /// players may cast a QuestVote — and emits `QuestVoteStarted`
    /// (public) and `QuestVoteRequested` (to each team member).
    pub async fn on_enter_quest_voting(ctx: &ServiceContext, game_id: Uuid) -> Result<(), CoreError> {
        let mut quest = Self::current_quest(ctx, game_id)
            .await?
            .ok_or_else(|| CoreError::conflict("no current quest on entering QuestVoting"))?;

        let rounds = ctx.store.get_rounds(game_id).await?;
        let round = rounds
            .into_iter()
            .filter(|r| r.quest_number == quest.quest_number)
            .max_by_key(|r| r.round_number)
            .ok_or_else(|| CoreError::conflict("no current round on entering QuestVoting"))?;

        quest.team_member_ids = round.team_member_ids.clone();
        ctx.store.update_quest(quest.clone()).await?;

        EventService::quest_vote_started(ctx, game_id, quest.quest_number, &quest.team_member_ids).await?;
        EventService::quest_vote_requested(ctx, game_id, quest.quest_number, &quest.team_member_ids).await
    }

    /// Validates the voter is on the current Quest's team and has not
    /// voted; persists the vote and tallies the quest once every team
    /// member has voted.
    pub async fn handle_cast_quest_vote(ctx: &ServiceContext, action: &Action) -> Result<(), CoreError> {
        let payload: CastQuestVotePayload = serde_json::from_value(action.payload.clone())
            .map_err(|e| CoreError::invalid(format!("malformed CastQuestVote payload: {e}")))?;

        ctx.store.get_player(action.game_id, payload.player_id).await?;
        let quest = ctx.store.get_quest(action.game_id, payload.quest_number).await?;
        if quest.is_complete() {
            return Err(CoreError::invalid(format!("quest {} already completed", payload.quest_number)));
        }
        if !quest.team_member_ids.contains(&payload.player_id) {
            return Err(CoreError::invalid(format!(
                "player {} is not on quest {}'s team",
                payload.player_id, payload.quest_number
            )));
        }

        let existing_votes = ctx.store.get_quest_votes(action.game_id, payload.quest_number).await?;
        if existing_votes.iter().any(|v| v.player_id == payload.player_id) {
            return Err(CoreError::invalid(format!(
                "player {} already voted for quest {}",
                payload.player_id, payload.quest_number
            )));
        }

        let result = VoteResult::from_approved(payload.is_approved);
        let vote = QuestVote {
            game_id: action.game_id,
            quest_number: payload.quest_number,
            player_id: payload.player_id,
            result,
        };
        ctx.store.put_quest_vote(vote).await?;
        EventService::quest_vote_cast(ctx, action.game_id, payload.quest_number, payload.player_id, result).await?;

        let votes = ctx.store.get_quest_votes(action.game_id, payload.quest_number).await?;
        if votes.len() < quest.team_member_ids.len() {
            return Ok(());
        }

        let num_players = ctx.store.get_players(action.game_id).await?.len();
        let fails = votes.iter().filter(|v| v.result == VoteResult::Fail).count();
        let tolerance = Self::fail_tolerance(num_players, payload.quest_number);
        let outcome = if fails <= tolerance { VoteResult::Pass } else { VoteResult::Fail };

        Self::complete_quest(ctx, action.game_id, payload.quest_number, outcome).await
    }

    async fn complete_quest(
        ctx: &ServiceContext,
        game_id: Uuid,
        quest_number: u8,
        result: VoteResult,
    ) -> Result<(), CoreError> {
        let mut quest = ctx.store.get_quest(game_id, quest_number).await?;
        quest.result = Some(result);
        ctx.store.update_quest(quest).await?;
        EventService::quest_completed(ctx, game_id, quest_number, result).await
    }

    /// True iff the count of Passed quests or Failed quests reaches 3 (a
    /// strict majority of the five-quest game).
    pub async fn has_majority(ctx: &ServiceContext, game_id: Uuid) -> Result<bool, CoreError> {
        let quests = ctx.store.get_quests(game_id).await?;
        let passed = quests.iter().filter(|q| q.result == Some(VoteResult::Pass)).count();
        let failed = quests.iter().filter(|q| q.result == Some(VoteResult::Fail)).count();
        Ok(GameService::majority_result(passed, failed).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{ActionType, Game, GameConfig, GameStatus, Player};
    use crate::messenger::recording::RecordingMessenger;
    use crate::messenger::Messenger;
    use crate::store::memory::InMemoryRecordStore;
    use crate::store::RecordStore;

    /// Ten-player game parked at quest 5 with five team members seated, the
    /// rest of the config left minimal.
    async fn ten_player_quest_five(ctx: &ServiceContext) -> (Uuid, Vec<Uuid>) {
        let game_id = Uuid::new_v4();
        let player_ids: Vec<Uuid> = (0..10).map(|_| Uuid::new_v4()).collect();

        for &id in &player_ids {
            let player = Player::new(id, game_id, "p".to_string(), "secret".to_string());
            ctx.store.put_player(player).await.unwrap();
        }

        let mut game = Game::new(game_id, Utc::now());
        game.status = GameStatus::InProgress;
        game.player_ids = player_ids.clone();
        game.config = Some(GameConfig {
            quest_team_size: HashMap::from([(5, 5)]),
            roles: Vec::new(),
            known_roles: HashMap::new(),
            assassination_attempts: 1,
        });
        ctx.store.put_game(game).await.unwrap();

        let team: Vec<Uuid> = player_ids.iter().take(5).copied().collect();
        let mut quest = Quest::new(game_id, 5);
        quest.team_member_ids = team.clone();
        ctx.store.put_quest(quest).await.unwrap();

        (game_id, team)
    }

    fn quest_vote_action(game_id: Uuid, player_id: Uuid, is_approved: bool) -> Action {
        Action::new(
            game_id,
            player_id,
            ActionType::CastQuestVote,
            serde_json::json!({
                "quest_number": 5,
                "player_id": player_id,
                "is_approved": is_approved,
            }),
        )
    }

    fn test_ctx() -> ServiceContext {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        let messenger: Arc<dyn Messenger> = Arc::new(RecordingMessenger::new());
        ServiceContext::with_seed(store, messenger, 0)
    }

    /// Ten players, quest 5: one Fail among five votes still Passes (the
    /// fifth-quest two-fail tolerance).
    #[tokio::test]
    async fn quest_five_of_ten_tolerates_a_single_fail() {
        let ctx = test_ctx();
        let (game_id, team) = ten_player_quest_five(&ctx).await;

        for (i, &member) in team.iter().enumerate() {
            let is_approved = i != 0; // one Fail, four Pass
            let action = quest_vote_action(game_id, member, is_approved);
            QuestService::handle_cast_quest_vote(&ctx, &action).await.unwrap();
        }

        let quest = ctx.store.get_quest(game_id, 5).await.unwrap();
        assert_eq!(quest.result, Some(VoteResult::Pass));
    }

    /// Ten players, quest 5: two Fails among five votes exceeds the
    /// tolerance and Fails the quest.
    #[tokio::test]
    async fn quest_five_of_ten_fails_on_two_fails() {
        let ctx = test_ctx();
        let (game_id, team) = ten_player_quest_five(&ctx).await;

        for (i, &member) in team.iter().enumerate() {
            let is_approved = i >= 2; // two Fails, three Pass
            let action = quest_vote_action(game_id, member, is_approved);
            QuestService::handle_cast_quest_vote(&ctx, &action).await.unwrap();
        }

        let quest = ctx.store.get_quest(game_id, 5).await.unwrap();
        assert_eq!(quest.result, Some(VoteResult::Fail));
    }
}
