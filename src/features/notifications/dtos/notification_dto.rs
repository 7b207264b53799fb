use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::notifications::models::Notification;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponseDto {
    pub id: i64,
    pub report_id: i64,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub seen: bool,
}

impl From<Notification> for NotificationResponseDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            report_id: n.report_id,
            message: n.message,
            sent_at: n.sent_at,
            seen: n.seen,
        }
    }
}

/// Result of marking every notification seen
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAllSeenResponseDto {
    pub updated: u64,
}
