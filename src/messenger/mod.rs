//! The Messenger contract: delivers a stored event either to all
//! connections of a game (`broadcast`) or to a single player's connection
//! (`notify`).

pub mod recording;
pub mod ws;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Event;

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Delivers `event` to every connection currently registered for
    /// `event.game_id`, in parallel, awaiting completion before returning.
    async fn broadcast(&self, event: &Event);

    /// Delivers `event` to `player_id`'s connection only, if any is
    /// currently registered. A missing connection is not an error: a
    /// disconnected player catches up by re-reading their event log.
    async fn notify(&self, player_id: Uuid, event: &Event);
}
