//! Player Service: joining a game before it starts, and the one-time role
//! assignment and visibility computation that runs at `StartGame`.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::domain::{Action, GameStatus, JoinGamePayload, Player, Role};
use crate::errors::CoreError;
use crate::services::event_service::EventService;
use crate::services::ServiceContext;

pub struct PlayerService;

impl PlayerService {
    /// Enforces game state `NotStarted`; allocates a server-side secret;
    /// persists a Player with empty role/known; emits `PlayerJoined`.
    pub async fn handle_join_game(ctx: &ServiceContext, action: &Action) -> Result<(), CoreError> {
        let game = ctx.store.get_game(action.game_id).await?;
        if game.status != GameStatus::NotStarted {
            return Err(CoreError::conflict("game has already started"));
        }

        let payload: JoinGamePayload = serde_json::from_value(action.payload.clone())
            .map_err(|e| CoreError::invalid(format!("malformed JoinGame payload: {e}")))?;

        let secret = Uuid::new_v4().to_string();
        let player = Player::new(action.player_id, action.game_id, payload.name.clone(), secret);
        ctx.store.put_player(player).await?;

        EventService::player_joined(ctx, action.game_id, action.player_id, &payload.name).await?;
        tracing::info!(game_id = %action.game_id, player_id = %action.player_id, "player joined");
        Ok(())
    }

    /// Invoked exactly once at game start. Shuffles the persisted players
    /// with `ctx`'s injectable RNG; assigns `roles[i]` to player `i`; any
    /// player past the end of `roles` receives `Villager`; computes each
    /// player's `known_player_ids` from `known_roles[player.role]`. Persists
    /// each mutated Player and returns them in shuffled order.
    pub async fn assign_roles(
        ctx: &ServiceContext,
        game_id: Uuid,
        roles: &[Role],
        known_roles: &HashMap<Role, Vec<Role>>,
    ) -> Result<Vec<Player>, CoreError> {
        let mut players = ctx.store.get_players(game_id).await?;
        {
            let mut rng = ctx.rng().await;
            players.shuffle(&mut *rng);
        }

        for (i, player) in players.iter_mut().enumerate() {
            player.role = Some(roles.get(i).copied().unwrap_or(Role::Villager));
        }

        let role_by_id: HashMap<Uuid, Role> = players
            .iter()
            .map(|p| (p.id, p.role.expect("role assigned above")))
            .collect();

        for player in players.iter_mut() {
            let role = player.role.expect("role assigned above");
            let visible_roles = known_roles.get(&role).cloned().unwrap_or_default();
            player.known_player_ids = role_by_id
                .iter()
                .filter(|(id, other_role)| **id != player.id && visible_roles.contains(other_role))
                .map(|(id, _)| *id)
                .collect();
        }

        for player in &players {
            ctx.store.update_player(player.clone()).await?;
        }

        Ok(players)
    }
}
