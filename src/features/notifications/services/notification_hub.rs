use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use super::push::{PushChannel, PushError};
use crate::features::notifications::models::Notification;

/// In-process registry of live notification streams, one broadcast channel per citizen.
///
/// Holds no durable data: a citizen who is not subscribed simply misses the live event
/// and sees the notification on the next list call.
pub struct NotificationHub {
    capacity: usize,
    channels: Mutex<HashMap<i64, broadcast::Sender<Notification>>>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<i64, broadcast::Sender<Notification>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Channels whose streams have all gone away are dropped here as well
    pub fn subscribe(&self, citizen_id: i64) -> broadcast::Receiver<Notification> {
        let mut channels = self.channels();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        channels
            .entry(citizen_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    #[cfg(test)]
    pub fn has_channel(&self, citizen_id: i64) -> bool {
        self.channels().contains_key(&citizen_id)
    }
}

impl PushChannel for NotificationHub {
    fn deliver(&self, citizen_id: i64, notification: &Notification) -> Result<(), PushError> {
        let mut channels = self.channels();

        let Some(sender) = channels.get(&citizen_id) else {
            return Err(PushError::NoSubscriber(citizen_id));
        };

        match sender.send(notification.clone()) {
            Ok(receivers) => {
                tracing::debug!(
                    "Pushed notification {} to {} stream(s) of citizen {}",
                    notification.id,
                    receivers,
                    citizen_id
                );
                Ok(())
            }
            Err(_) => {
                // Every stream went away; drop the channel so the map does not grow
                channels.remove(&citizen_id);
                Err(PushError::NoSubscriber(citizen_id))
            }
        }
    }
}
