//! Service entrypoint: load config, init tracing, connect Postgres, build
//! the axum router from the ws + http scaffolds, serve.

use std::sync::Arc;

use avalon_core_be::config::AppConfig;
use avalon_core_be::messenger::ws::WsMessenger;
use avalon_core_be::store::postgres::PostgresRecordStore;
use avalon_core_be::{http, ws, AppState};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PostgresRecordStore::new(pool));
    let messenger = Arc::new(WsMessenger::new());

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, store, messenger);

    // Timeout and concurrency-limit guard the admin HTTP surface only; a
    // websocket connection is long-lived by design and must not be capped.
    let http_routes = http::router(state.clone())
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(ConcurrencyLimitLayer::new(256));

    let app = ws::router(state)
        .merge(http_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!(%bind_addr, "starting avalon-core-serve");
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
