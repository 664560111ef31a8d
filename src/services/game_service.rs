//! Game Service: starting a game, running the assassination phase, and
//! ending it.

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::config_data::{default_roles, is_supported_player_count, DEFAULT_ASSASSINATION_ATTEMPTS, DEFAULT_QUEST_TEAM_SIZE, KNOWN_ROLES};
use crate::domain::{Action, GameConfig, GameResult, GameStatus, Role, StartGamePayload, SubmitAssassinationTargetPayload};
use crate::errors::CoreError;
use crate::services::event_service::EventService;
use crate::services::player_service::PlayerService;
use crate::services::ServiceContext;

pub struct GameService;

impl GameService {
    /// Enforces `status = NotStarted`; validates the submitted `player_ids`
    /// match the persisted player ids; derives role list and known-roles
    /// (from payload overrides or the defaults in `config_data`); assigns
    /// roles; writes back `config`, `player_ids`, and flips `status` to
    /// `InProgress`; emits per-player `GameStarted` events.
    pub async fn handle_start_game(ctx: &ServiceContext, action: &Action) -> Result<(), CoreError> {
        let mut game = ctx.store.get_game(action.game_id).await?;
        if game.status != GameStatus::NotStarted {
            return Err(CoreError::conflict(format!(
                "game {} is not NotStarted, got {:?}",
                action.game_id, game.status
            )));
        }

        let payload: StartGamePayload = serde_json::from_value(action.payload.clone())
            .map_err(|e| CoreError::invalid(format!("malformed StartGame payload: {e}")))?;

        let num_players = payload.player_ids.len();
        if !is_supported_player_count(num_players) {
            return Err(CoreError::invalid(format!(
                "only 5 to 10 players are supported, got {num_players}"
            )));
        }

        let roles: Vec<Role> = match payload.roles {
            Some(roles) => roles,
            None => default_roles(num_players)
                .ok_or_else(|| CoreError::invalid(format!("no default roles for {num_players} players")))?,
        };
        let known_roles: HashMap<Role, Vec<Role>> = payload.known_roles.unwrap_or_else(|| KNOWN_ROLES.clone());

        let players = PlayerService::assign_roles(ctx, action.game_id, &roles, &known_roles).await?;

        let given: std::collections::HashSet<Uuid> = payload.player_ids.iter().copied().collect();
        let actual: std::collections::HashSet<Uuid> = players.iter().map(|p| p.id).collect();
        if given != actual {
            return Err(CoreError::invalid(
                "player_ids in StartGame payload does not match the game's persisted players",
            ));
        }

        let quest_team_size = DEFAULT_QUEST_TEAM_SIZE
            .get(&(num_players as u8))
            .cloned()
            .ok_or_else(|| CoreError::invalid(format!("no quest team sizes for {num_players} players")))?;

        game.status = GameStatus::InProgress;
        game.player_ids = payload.player_ids.clone();
        game.config = Some(GameConfig {
            quest_team_size,
            roles,
            known_roles,
            assassination_attempts: payload.assassination_attempts.unwrap_or(DEFAULT_ASSASSINATION_ATTEMPTS),
        });
        let expected_state = game.state;
        ctx.store.update_game(game, expected_state).await?;

        EventService::game_started(ctx, action.game_id, &players).await?;
        tracing::info!(game_id = %action.game_id, num_players, "game started");
        Ok(())
    }

    async fn assassination_attempts_remaining(ctx: &ServiceContext, game_id: Uuid) -> Result<u32, CoreError> {
        let game = ctx.store.get_game(game_id).await?;
        if let Some(remaining) = game.assassination_attempts {
            return Ok(remaining);
        }
        game.config
            .ok_or_else(|| CoreError::conflict(format!("game {game_id} has no config")))
            .map(|c| c.assassination_attempts)
    }

    async fn assassin(ctx: &ServiceContext, game_id: Uuid) -> Result<crate::domain::Player, CoreError> {
        let players = ctx.store.get_players(game_id).await?;
        let mut assassins = players.into_iter().filter(|p| p.role == Some(Role::Assassin));
        let assassin = assassins
            .next()
            .ok_or_else(|| CoreError::conflict(format!("game {game_id} has no assassin")))?;
        if assassins.next().is_some() {
            return Err(CoreError::conflict(format!("game {game_id} has more than one assassin")));
        }
        Ok(assassin)
    }

    /// Runs on entering EndGame: emits `AssassinationStarted` then requests
    /// a target from the sole assassin.
    pub async fn on_enter_end_game(ctx: &ServiceContext, game_id: Uuid) -> Result<(), CoreError> {
        let assassin = Self::assassin(ctx, game_id).await?;
        let attempts = Self::assassination_attempts_remaining(ctx, game_id).await?;

        let mut game = ctx.store.get_game(game_id).await?;
        if game.assassination_attempts.is_none() {
            game.assassination_attempts = Some(attempts);
            let expected_state = game.state;
            ctx.store.update_game(game, expected_state).await?;
        }

        EventService::assassination_started(ctx, game_id, attempts).await?;
        EventService::assassination_target_requested(ctx, game_id, assassin.id).await
    }

    /// Decrements the attempt counter, resolves whether the target is
    /// Merlin, and ends the game on success or on a miss that exhausts the
    /// last attempt. Only the assassin may submit — `AssassinationTargetRequested`
    /// is sent to the assassin alone, so any other caller is rejected. A miss
    /// with attempts remaining re-sends `AssassinationTargetRequested` for the
    /// next try, since this case never revisits EndGame's `on_enter`.
    pub async fn handle_submit_assassination_target(ctx: &ServiceContext, action: &Action) -> Result<(), CoreError> {
        let payload: SubmitAssassinationTargetPayload = serde_json::from_value(action.payload.clone())
            .map_err(|e| CoreError::invalid(format!("malformed SubmitAssassinationTarget payload: {e}")))?;

        let assassin = Self::assassin(ctx, action.game_id).await?;
        if assassin.id != action.player_id {
            return Err(CoreError::invalid("only the assassin may submit an assassination target"));
        }

        let target = ctx.store.get_player(action.game_id, payload.target_id).await?;

        let mut game = ctx.store.get_game(action.game_id).await?;
        let attempts = game
            .assassination_attempts
            .ok_or_else(|| CoreError::conflict("assassination phase not yet entered"))?;
        if attempts == 0 {
            return Err(CoreError::conflict("no assassination attempts remaining"));
        }
        game.assassination_attempts = Some(attempts - 1);
        let expected_state = game.state;
        ctx.store.update_game(game, expected_state).await?;

        let succeeded = target.role == Some(Role::Merlin);
        EventService::assassination_result(ctx, action.game_id, payload.target_id, succeeded).await?;

        if succeeded {
            Self::end_game(ctx, action.game_id, GameResult::EvilWins).await?;
        } else if attempts - 1 == 0 {
            Self::end_game(ctx, action.game_id, GameResult::GoodWins).await?;
        } else {
            // A miss with attempts remaining re-enters EndGame as a same-state
            // transition, so the dispatch loop's on_enter/on_exit skip applies
            // and on_enter_end_game never runs again. Re-request the target
            // here instead, or the assassin is never told they get another shot.
            EventService::assassination_target_requested(ctx, action.game_id, assassin.id).await?;
        }
        Ok(())
    }

    /// Flips `status` to `Finished`, records the final `result`, and emits
    /// `GameEnded` with every player's revealed role.
    pub async fn end_game(ctx: &ServiceContext, game_id: Uuid, result: GameResult) -> Result<(), CoreError> {
        let mut game = ctx.store.get_game(game_id).await?;
        game.status = GameStatus::Finished;
        game.result = Some(result);
        let expected_state = game.state;
        ctx.store.update_game(game, expected_state).await?;

        let players = ctx.store.get_players(game_id).await?;
        let player_roles: HashMap<Uuid, Role> = players
            .into_iter()
            .filter_map(|p| p.role.map(|role| (p.id, role)))
            .collect();
        EventService::game_ended(ctx, game_id, &player_roles).await?;
        tracing::info!(game_id = %game_id, ?result, "game ended");
        Ok(())
    }

    /// True once a quest majority is reached: the winner is Good if Passed
    /// quests reach 3, else Evil (resolved via assassination if Good wins
    /// the quest majority, handled by the state machine's EndGame entry).
    pub fn majority_result(passed: usize, failed: usize) -> Option<GameResult> {
        if passed >= 3 {
            Some(GameResult::GoodWins)
        } else if failed >= 3 {
            Some(GameResult::EvilWins)
        } else {
            None
        }
    }
}
