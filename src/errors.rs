use thiserror::Error;

/// Every fallible core operation returns
/// `Result<_, CoreError>`; callers map these onto their own transport
/// (HTTP status, websocket close code, etc.) — this crate does not assume one.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Referenced entity absent (game, player, quest, round). Action has no effect.
    #[error("not found: {0}")]
    NotFound(String),

    /// Payload malformed, wrong type for state, team-size mismatch, unknown
    /// player id, duplicate vote, caller is not the current leader, etc.
    /// No events are emitted for an `Invalid` action (services validate
    /// before emission).
    #[error("invalid: {0}")]
    Invalid(String),

    /// Game is in the wrong state/status for the requested action, or an
    /// invariant like "exactly one assassin" is violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Record-store failure during what would otherwise be a successful
    /// handler path. The action fails; the Game's `state` field is not advanced.
    #[error("store failure: {0}")]
    Store(#[from] crate::store::StoreError),

    /// Messenger delivery failure. This is logged and swallowed at the
    /// per-connection level inside the messenger adapter;
    /// this variant exists for adapters that choose to surface it anyway
    /// (e.g. a broadcast that could not reach a single connection).
    #[error("transport failure: {0}")]
    Transport(String),
}

impl CoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        CoreError::Invalid(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::Conflict(msg.into())
    }
}
