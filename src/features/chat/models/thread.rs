use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{ParticipantRole, SenderType};
use crate::features::auth::model::{AuthenticatedUser, Role};
use crate::features::reports::models::ReportStatus;

/// Which report column identifies a participant's threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadScope {
    /// Reports the citizen created
    Citizen(i64),
    /// Reports whose `assigned_technical_staff_id` matches
    TechnicalStaff(i64),
    /// Reports whose `assigned_external_maintainer_id` matches
    ExternalMaintainer(i64),
}

impl ThreadScope {
    /// External maintainers filter on their own column; every other operator role,
    /// reviewers and administrators included, filters on the technical-staff column.
    pub fn for_participant(user: &AuthenticatedUser) -> Self {
        match user.role {
            Role::Citizen => ThreadScope::Citizen(user.id),
            Role::ExternalMaintainer => ThreadScope::ExternalMaintainer(user.id),
            Role::MunicipalReviewer | Role::TechnicalStaff | Role::Administrator => {
                ThreadScope::TechnicalStaff(user.id)
            }
        }
    }

    pub fn participant_id(&self) -> i64 {
        match self {
            ThreadScope::Citizen(id)
            | ThreadScope::TechnicalStaff(id)
            | ThreadScope::ExternalMaintainer(id) => *id,
        }
    }

    pub fn participant_role(&self) -> ParticipantRole {
        match self {
            ThreadScope::Citizen(_) => ParticipantRole::Citizen,
            ThreadScope::TechnicalStaff(_) | ThreadScope::ExternalMaintainer(_) => {
                ParticipantRole::Operator
            }
        }
    }

    /// Whether a report with the given parties belongs to this scope
    #[cfg(test)]
    pub fn includes(
        &self,
        citizen_id: i64,
        technical_staff_id: Option<i64>,
        external_maintainer_id: Option<i64>,
    ) -> bool {
        match *self {
            ThreadScope::Citizen(id) => citizen_id == id,
            ThreadScope::TechnicalStaff(id) => technical_staff_id == Some(id),
            ThreadScope::ExternalMaintainer(id) => external_maintainer_id == Some(id),
        }
    }
}

/// Denormalized copy of the latest message in a thread
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSnapshot {
    pub content: String,
    pub sender_type: SenderType,
    pub sent_at: DateTime<Utc>,
}

/// One conversation row in a participant's inbox
#[derive(Debug, Clone, PartialEq)]
pub struct ChatThread {
    pub report_id: i64,
    pub report_title: String,
    pub status: ReportStatus,
    pub last_message: Option<MessageSnapshot>,
    pub message_count: i64,
    /// Latest message time, or report creation when the thread is empty
    pub last_activity_at: DateTime<Utc>,
    pub unread_count: i64,
}

/// Flat row shape returned by the thread listing query
#[derive(Debug, Clone, FromRow)]
pub struct ChatThreadRow {
    pub report_id: i64,
    pub report_title: String,
    pub status: ReportStatus,
    pub last_message_content: Option<String>,
    pub last_message_sender_type: Option<SenderType>,
    pub last_message_sent_at: Option<DateTime<Utc>>,
    pub message_count: i64,
    pub last_activity_at: DateTime<Utc>,
    pub unread_count: i64,
}

impl From<ChatThreadRow> for ChatThread {
    fn from(row: ChatThreadRow) -> Self {
        let last_message = match (
            row.last_message_content,
            row.last_message_sender_type,
            row.last_message_sent_at,
        ) {
            (Some(content), Some(sender_type), Some(sent_at)) => Some(MessageSnapshot {
                content,
                sender_type,
                sent_at,
            }),
            _ => None,
        };

        Self {
            report_id: row.report_id,
            report_title: row.report_title,
            status: row.status,
            last_message,
            message_count: row.message_count,
            last_activity_at: row.last_activity_at,
            unread_count: row.unread_count,
        }
    }
}
