//! `AppState`: the ambient wiring a runnable service needs around the core
//! game logic plus a concrete store and messenger, one shared, `Clone`-able
//! handle threaded through every axum handler.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::Action;
use crate::errors::CoreError;
use crate::messenger::ws::WsMessenger;
use crate::messenger::Messenger;
use crate::services::ServiceContext;
use crate::state_machine::{StateMachine, StateName};
use crate::store::RecordStore;

/// Per-game mutexes, lazily created: concurrent actions for the same
/// `game_id` are linearized, while different games dispatch fully in
/// parallel, via an in-process map of `game_id -> lock`.
#[derive(Default)]
struct GameLocks {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl GameLocks {
    async fn acquire(&self, game_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(game_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn RecordStore>,
    pub messenger: Arc<WsMessenger>,
    state_machine: Arc<StateMachine>,
    ctx: Arc<ServiceContext>,
    locks: Arc<GameLocks>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>, messenger: Arc<WsMessenger>) -> Self {
        let ctx = Arc::new(ServiceContext::new(
            store.clone(),
            messenger.clone() as Arc<dyn Messenger>,
        ));
        Self {
            config,
            store,
            messenger,
            state_machine: Arc::new(StateMachine::new()),
            ctx,
            locks: Arc::new(GameLocks::default()),
        }
    }

    /// Dispatches one Action through the state machine after acquiring the
    /// per-game serialization lock. The lock is released as
    /// soon as `StateMachine::dispatch` returns, including on error.
    pub async fn dispatch(&self, action: Action) -> Result<StateName, CoreError> {
        let lock = self.locks.acquire(action.game_id).await;
        let _guard = lock.lock().await;
        self.state_machine.dispatch(&self.ctx, action).await
    }
}
