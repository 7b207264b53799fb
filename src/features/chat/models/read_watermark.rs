use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

use super::SenderType;

/// Side of the conversation a watermark belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "participant_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Citizen,
    Operator,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Citizen => "citizen",
            ParticipantRole::Operator => "operator",
        }
    }

    /// A message is unread-eligible for a viewer when it came from the other side.
    /// System messages are never authored by the viewer, so they always qualify.
    pub fn is_counterpart(&self, sender: SenderType) -> bool {
        sender.as_str() != self.as_str()
    }

    /// Sender types whose messages count as unread for this side
    pub fn counterpart_senders(&self) -> Vec<String> {
        SenderType::ALL
            .into_iter()
            .filter(|s| self.is_counterpart(*s))
            .map(|s| s.as_str().to_string())
            .collect()
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one watermark row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatermarkKey {
    pub role: ParticipantRole,
    pub participant_id: i64,
    pub report_id: i64,
}

impl WatermarkKey {
    pub fn new(role: ParticipantRole, participant_id: i64, report_id: i64) -> Self {
        Self {
            role,
            participant_id,
            report_id,
        }
    }
}

/// Database model for the last-read timestamp of one participant on one report
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, ToSchema)]
pub struct ReadWatermark {
    pub participant_role: ParticipantRole,
    pub participant_id: i64,
    pub report_id: i64,
    pub last_read_at: DateTime<Utc>,
}
