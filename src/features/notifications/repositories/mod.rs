mod pg_notification_repository;

pub use pg_notification_repository::PgNotificationRepository;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::notifications::models::{NewNotification, Notification};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &NewNotification) -> Result<Notification>;

    /// Newest first
    async fn list_for_citizen(&self, citizen_id: i64) -> Result<Vec<Notification>>;

    /// Returns `None` unless the notification exists and belongs to the citizen
    async fn mark_seen(&self, id: i64, citizen_id: i64) -> Result<Option<Notification>>;

    /// Number of notifications flipped to seen
    async fn mark_all_seen(&self, citizen_id: i64) -> Result<u64>;
}
