use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::role::Role;

/// The `Player` entity. `role` and `known_player_ids` are set exactly
/// once, at the GameSetup -> TeamSelection transition, and never change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub game_id: Uuid,
    pub name: String,
    /// Server-issued authentication token; never serialized back to clients
    /// other than the owning player's own join-confirmation event.
    #[serde(skip_serializing)]
    pub secret: String,
    pub role: Option<Role>,
    pub known_player_ids: Vec<Uuid>,
}

impl Player {
    pub fn new(id: Uuid, game_id: Uuid, name: String, secret: String) -> Self {
        Self {
            id,
            game_id,
            name,
            secret,
            role: None,
            known_player_ids: Vec::new(),
        }
    }
}
