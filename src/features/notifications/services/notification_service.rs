use std::sync::Arc;

use super::push::PushChannel;
use crate::core::error::{AppError, Result};
use crate::features::notifications::models::{NewNotification, Notification};
use crate::features::notifications::repositories::NotificationRepository;

/// Durable citizen notifications with optional live push
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    /// Store the notification, then hand it to `push` if one is supplied.
    ///
    /// The stored row is the source of truth: a failed push is logged and dropped.
    pub async fn create(
        &self,
        citizen_id: i64,
        report_id: i64,
        message: &str,
        push: Option<&dyn PushChannel>,
    ) -> Result<Notification> {
        if citizen_id <= 0 || report_id <= 0 {
            return Err(AppError::InvalidArgument(
                "Citizen and report ids must be positive".to_string(),
            ));
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::InvalidArgument(
                "Notification message cannot be empty".to_string(),
            ));
        }

        let notification = self
            .repo
            .insert(&NewNotification {
                citizen_id,
                report_id,
                message: message.to_string(),
            })
            .await?;

        tracing::info!(
            "Created notification {} for citizen {} on report {}",
            notification.id,
            citizen_id,
            report_id
        );

        if let Some(channel) = push {
            if let Err(e) = channel.deliver(citizen_id, &notification) {
                tracing::debug!(
                    "Live push of notification {} skipped: {}",
                    notification.id,
                    e
                );
            }
        }

        Ok(notification)
    }

    pub async fn list_for_citizen(&self, citizen_id: i64) -> Result<Vec<Notification>> {
        self.repo.list_for_citizen(citizen_id).await
    }

    /// `None` when the notification is missing or owned by someone else
    pub async fn mark_seen(
        &self,
        notification_id: i64,
        citizen_id: i64,
    ) -> Result<Option<Notification>> {
        self.repo.mark_seen(notification_id, citizen_id).await
    }

    pub async fn mark_all_seen(&self, citizen_id: i64) -> Result<u64> {
        let updated = self.repo.mark_all_seen(citizen_id).await?;
        tracing::info!(
            "Marked {} notification(s) seen for citizen {}",
            updated,
            citizen_id
        );
        Ok(updated)
    }
}
