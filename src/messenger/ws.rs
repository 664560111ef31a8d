//! Concrete `Messenger` backed by websocket connections.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{self, SplitSink, StreamExt};
use futures::SinkExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::Event;
use crate::messenger::Messenger;

pub type ConnectionSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Cap on simultaneous in-flight sends during a broadcast, so a large lobby
/// doesn't spawn one task per connection all at once.
const BROADCAST_CONCURRENCY: usize = 32;

/// Tracks live websocket connections by `game_id`, with a secondary index
/// by `(game_id, player_id)` for O(1) `notify` lookups.
#[derive(Default)]
struct ConnectionRegistry {
    by_game: HashMap<Uuid, HashMap<Uuid, ConnectionSender>>,
    by_player: HashMap<(Uuid, Uuid), Uuid>,
}

pub struct WsMessenger {
    registry: Mutex<ConnectionRegistry>,
}

impl WsMessenger {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(ConnectionRegistry::default()),
        }
    }

    pub async fn register(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        connection_id: Uuid,
        sender: ConnectionSender,
    ) {
        let mut registry = self.registry.lock().await;
        registry
            .by_game
            .entry(game_id)
            .or_default()
            .insert(connection_id, sender);
        registry.by_player.insert((game_id, player_id), connection_id);
    }

    pub async fn unregister(&self, game_id: Uuid, connection_id: Uuid) {
        let mut registry = self.registry.lock().await;
        if let Some(conns) = registry.by_game.get_mut(&game_id) {
            conns.remove(&connection_id);
        }
        registry
            .by_player
            .retain(|_, conn_id| *conn_id != connection_id);
    }
}

impl Default for WsMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for WsMessenger {
    async fn broadcast(&self, event: &Event) {
        let Ok(json) = serde_json::to_string(event) else {
            tracing::error!(game_id = %event.game_id, "failed to serialize event for broadcast");
            return;
        };

        let senders: Vec<ConnectionSender> = {
            let registry = self.registry.lock().await;
            registry
                .by_game
                .get(&event.game_id)
                .map(|conns| conns.values().cloned().collect())
                .unwrap_or_default()
        };

        stream::iter(senders)
            .for_each_concurrent(BROADCAST_CONCURRENCY, |sender| {
                let json = json.clone();
                async move {
                    let mut sender = sender.lock().await;
                    let _ = sender.send(Message::Text(json.into())).await;
                }
            })
            .await;
    }

    async fn notify(&self, player_id: Uuid, event: &Event) {
        let Ok(json) = serde_json::to_string(event) else {
            tracing::error!(game_id = %event.game_id, "failed to serialize event for notify");
            return;
        };

        let sender = {
            let registry = self.registry.lock().await;
            registry
                .by_player
                .get(&(event.game_id, player_id))
                .and_then(|conn_id| registry.by_game.get(&event.game_id)?.get(conn_id))
                .cloned()
        };

        if let Some(sender) = sender {
            let mut sender = sender.lock().await;
            if sender.send(Message::Text(json.into())).await.is_err() {
                tracing::warn!(game_id = %event.game_id, %player_id, "delivery to connection failed, dropping");
            }
        }
    }
}
