//! Ambient configuration, loaded from the environment: `dotenvy` populates
//! `std::env`, then each setting is read with a clear error if missing.
//! Game constant tables (quest team sizes, known-roles visibility, default
//! role composition, default assassination attempts) are data, not
//! configuration — see `domain::config_data`.

use std::env;
use std::net::SocketAddr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Loads `.env` (if present) then reads `DATABASE_URL` (required) and
    /// `BIND_ADDR` (defaults to `0.0.0.0:8080`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|e| ConfigError::Invalid("BIND_ADDR", format!("{e}")))?;

        Ok(Self {
            database_url,
            bind_addr,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
