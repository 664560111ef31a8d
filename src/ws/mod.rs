//! Websocket receive endpoint: one upgrade handler per connection, a read
//! loop that turns inbound JSON frames into Actions, and a registration
//! step against the concrete [`WsMessenger`].

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::app::AppState;
use crate::domain::{Action, ActionType};
use crate::messenger::ws::ConnectionSender;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws/{game_id}/{player_id}", get(upgrade))
        .with_state(state)
}

/// Wire shape of an inbound frame: the connection already identifies
/// `game_id`/`player_id` (from the URL), so clients send only `type` and
/// `payload` — the Action surface minus the envelope fields the transport
/// fills in.
#[derive(Debug, Deserialize)]
struct IncomingAction {
    #[serde(rename = "type")]
    action_type: ActionType,
    #[serde(default)]
    payload: serde_json::Value,
}

async fn upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path((game_id, player_id)): Path<(Uuid, Uuid)>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, game_id, player_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, game_id: Uuid, player_id: Uuid) {
    let connection_id = Uuid::new_v4();
    let (sink, mut stream) = socket.split();
    let sender: ConnectionSender = Arc::new(Mutex::new(sink));

    state
        .messenger
        .register(game_id, player_id, connection_id, sender.clone())
        .await;
    tracing::info!(%game_id, %player_id, %connection_id, "websocket connected");

    replay_event_log(&state, &sender, game_id, player_id).await;

    while let Some(Ok(msg)) = stream.next().await {
        let Message::Text(text) = msg else { continue };
        let incoming: IncomingAction = match serde_json::from_str(&text) {
            Ok(incoming) => incoming,
            Err(e) => {
                send_error(&sender, &format!("malformed action: {e}")).await;
                continue;
            }
        };

        let action = Action::new(game_id, player_id, incoming.action_type, incoming.payload);
        if let Err(err) = state.dispatch(action).await {
            tracing::warn!(%game_id, %player_id, error = %err, "action rejected");
            send_error(&sender, &err.to_string()).await;
        }
    }

    state.messenger.unregister(game_id, connection_id).await;
    tracing::info!(%game_id, %player_id, %connection_id, "websocket disconnected");
}

/// Re-reads this player's ordered event log and replays it directly over
/// the freshly opened connection. Re-reading the log is the full extent of
/// reconnection support this core provides.
async fn replay_event_log(state: &AppState, sender: &ConnectionSender, game_id: Uuid, player_id: Uuid) {
    let events = match state.store.get_events(game_id, player_id).await {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!(%game_id, %player_id, error = %e, "failed to replay event log");
            return;
        }
    };
    for event in events {
        if let Ok(json) = serde_json::to_string(&event) {
            let mut sink = sender.lock().await;
            let _ = sink.send(Message::Text(json.into())).await;
        }
    }
}

async fn send_error(sender: &ConnectionSender, message: &str) {
    let body = serde_json::json!({ "type": "error", "message": message });
    if let Ok(json) = serde_json::to_string(&body) {
        let mut sink = sender.lock().await;
        let _ = sink.send(Message::Text(json.into())).await;
    }
}
