use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Who authored a message. `Operator` covers every non-citizen role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "sender_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Citizen,
    Operator,
    /// Synthetic entries such as status-change announcements
    System,
}

impl SenderType {
    pub const ALL: [SenderType; 3] = [
        SenderType::Citizen,
        SenderType::Operator,
        SenderType::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::Citizen => "citizen",
            SenderType::Operator => "operator",
            SenderType::System => "system",
        }
    }
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for a conversation message. Immutable once stored.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Message {
    pub id: i64,
    pub report_id: i64,
    pub sender_type: SenderType,
    pub sender_id: Option<i64>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// Data for appending a message; the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub report_id: i64,
    pub sender_type: SenderType,
    pub sender_id: Option<i64>,
    pub content: String,
}
