//! Player / Round / Quest / Game services plus the Event Service all of
//! them funnel through. Each service is a stateless set of methods taking
//! a [`ServiceContext`]; no service holds its own state.

pub mod event_service;
pub mod game_service;
pub mod player_service;
pub mod quest_service;
pub mod round_service;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use crate::messenger::Messenger;
use crate::store::RecordStore;

/// Shared dependencies every service method needs: the record store, the
/// messenger, and an injectable RNG for role assignment — seedable so
/// tests can assert deterministic permutations.
pub struct ServiceContext {
    pub store: Arc<dyn RecordStore>,
    pub messenger: Arc<dyn Messenger>,
    rng: Mutex<StdRng>,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn RecordStore>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            store,
            messenger,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic RNG for tests: identical seeds produce identical role
    /// permutations across runs.
    pub fn with_seed(store: Arc<dyn RecordStore>, messenger: Arc<dyn Messenger>, seed: u64) -> Self {
        Self {
            store,
            messenger,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub(crate) async fn rng(&self) -> tokio::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().await
    }
}
