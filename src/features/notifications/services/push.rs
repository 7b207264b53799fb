use crate::features::notifications::models::Notification;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("No live subscriber for citizen {0}")]
    NoSubscriber(i64),
}

/// Live delivery of a freshly stored notification to one citizen.
///
/// Implementations must not block; the durable row already exists when this runs.
pub trait PushChannel: Send + Sync {
    fn deliver(&self, citizen_id: i64, notification: &Notification) -> Result<(), PushError>;
}
