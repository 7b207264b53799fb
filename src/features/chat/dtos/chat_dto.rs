use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::chat::models::{ChatThread, Message, MessageSnapshot, SenderType};
use crate::features::reports::models::ReportStatus;
use crate::shared::constants::MAX_MESSAGE_LENGTH;

/// Request DTO for posting a message
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = MAX_MESSAGE_LENGTH))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponseDto {
    pub id: i64,
    pub report_id: i64,
    pub sender_type: SenderType,
    pub sender_id: Option<i64>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl From<Message> for MessageResponseDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            report_id: m.report_id,
            sender_type: m.sender_type,
            sender_id: m.sender_id,
            content: m.content,
            sent_at: m.sent_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LastMessageDto {
    pub content: String,
    pub sender_type: SenderType,
    pub sent_at: DateTime<Utc>,
}

impl From<MessageSnapshot> for LastMessageDto {
    fn from(s: MessageSnapshot) -> Self {
        Self {
            content: s.content,
            sender_type: s.sender_type,
            sent_at: s.sent_at,
        }
    }
}

/// Inbox row for one report conversation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThreadResponseDto {
    pub report_id: i64,
    pub report_title: String,
    pub status: ReportStatus,
    pub last_message: Option<LastMessageDto>,
    pub message_count: i64,
    pub last_activity_at: DateTime<Utc>,
    pub unread_count: i64,
}

impl From<ChatThread> for ThreadResponseDto {
    fn from(t: ChatThread) -> Self {
        Self {
            report_id: t.report_id,
            report_title: t.report_title,
            status: t.status,
            last_message: t.last_message.map(LastMessageDto::from),
            message_count: t.message_count,
            last_activity_at: t.last_activity_at,
            unread_count: t.unread_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountDto {
    pub unread_count: i64,
}
