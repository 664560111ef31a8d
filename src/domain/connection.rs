use uuid::Uuid;

/// Maps a `(game_id, player_id)` to the transport-level connection currently
/// representing that player. Overwritten on reconnect: rejoin-after-disconnect
/// is handled by last-write-wins here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConnection {
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub connection_id: Uuid,
}
