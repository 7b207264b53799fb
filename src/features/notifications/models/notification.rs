use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Database model for a durable citizen notification.
/// Only `seen` ever changes after insert, and only by the owning citizen.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub citizen_id: i64,
    pub report_id: i64,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub seen: bool,
}

/// Data for creating a notification
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub citizen_id: i64,
    pub report_id: i64,
    pub message: String,
}
