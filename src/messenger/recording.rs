//! Test double for `Messenger`: records delivered events instead of opening
//! sockets, so state-machine and service tests can assert on exactly what
//! was broadcast/notified without any transport.

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::Event;
use crate::messenger::Messenger;

#[derive(Debug, Clone)]
pub enum Delivery {
    Broadcast(Event),
    Notify(Uuid, Event),
}

#[derive(Default)]
pub struct RecordingMessenger {
    deliveries: Mutex<Vec<Delivery>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().await.clone()
    }

    pub async fn events(&self) -> Vec<Event> {
        self.deliveries
            .lock()
            .await
            .iter()
            .map(|d| match d {
                Delivery::Broadcast(e) => e.clone(),
                Delivery::Notify(_, e) => e.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn broadcast(&self, event: &Event) {
        self.deliveries
            .lock()
            .await
            .push(Delivery::Broadcast(event.clone()));
    }

    async fn notify(&self, player_id: Uuid, event: &Event) {
        self.deliveries
            .lock()
            .await
            .push(Delivery::Notify(player_id, event.clone()));
    }
}
