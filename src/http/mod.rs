//! Admin HTTP endpoint: a thin, non-exhaustive scaffold around an
//! `http::routes::admin` / `http::handlers` split, trimmed to the one
//! operation this core actually needs an HTTP surface for: creating a game
//! record before anyone can `JoinGame`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::domain::Game;
use crate::errors::CoreError;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/games", post(create_game))
        .route("/admin/games/{game_id}", get(get_game))
        .with_state(state)
}

#[derive(Serialize)]
struct CreateGameResponse {
    game_id: Uuid,
}

/// Creates a new `Game` record in `GameSetup`/`NotStarted`. No payload: the
/// admin merely reserves a `game_id` for players to join.
async fn create_game(State(state): State<AppState>) -> Result<Json<CreateGameResponse>, ApiError> {
    let game_id = Uuid::new_v4();
    let game = Game::new(game_id, Utc::now());
    state.store.put_game(game).await?;
    tracing::info!(%game_id, "game created");
    Ok(Json(CreateGameResponse { game_id }))
}

async fn get_game(
    State(state): State<AppState>,
    axum::extract::Path(game_id): axum::extract::Path<Uuid>,
) -> Result<Json<Game>, ApiError> {
    let game = state.store.get_game(game_id).await?;
    Ok(Json(game))
}

/// Maps `CoreError` onto HTTP status codes at this adapter boundary only —
/// the core itself is transport-agnostic.
struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        Self(CoreError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
            CoreError::Conflict(_) => StatusCode::CONFLICT,
            CoreError::Transport(_) => StatusCode::BAD_GATEWAY,
            CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}
