use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::AuthenticatedUser;
use crate::features::chat::models::{ChatThread, Message, NewMessage, SenderType, ThreadScope};
use crate::features::chat::repositories::ChatRepository;
use crate::shared::constants::MAX_MESSAGE_LENGTH;

/// Append-only per-report conversations.
///
/// Participant checks belong to the caller; this service only validates content.
pub struct ConversationService {
    repo: Arc<dyn ChatRepository>,
}

impl ConversationService {
    pub fn new(repo: Arc<dyn ChatRepository>) -> Self {
        Self { repo }
    }

    pub async fn append(
        &self,
        report_id: i64,
        sender_type: SenderType,
        sender_id: Option<i64>,
        content: &str,
    ) -> Result<Message> {
        match (sender_type, sender_id) {
            (SenderType::System, None) => {}
            (SenderType::System, Some(_)) => {
                return Err(AppError::InvalidArgument(
                    "System messages have no sender".to_string(),
                ))
            }
            (_, Some(id)) if id > 0 => {}
            _ => {
                return Err(AppError::InvalidArgument(
                    "Sender id must be a positive integer".to_string(),
                ))
            }
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::InvalidArgument(
                "Message content cannot be empty".to_string(),
            ));
        }
        if content.chars().count() as u64 > MAX_MESSAGE_LENGTH {
            return Err(AppError::InvalidArgument(format!(
                "Message content exceeds {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }

        self.repo
            .insert_message(&NewMessage {
                report_id,
                sender_type,
                sender_id,
                content: content.to_string(),
            })
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))
    }

    /// Post a synthetic message that no participant authored
    pub async fn announce(&self, report_id: i64, content: &str) -> Result<Message> {
        self.append(report_id, SenderType::System, None, content).await
    }

    pub async fn list(&self, report_id: i64) -> Result<Vec<Message>> {
        self.repo.list_messages(report_id).await
    }

    pub async fn list_threads_for(&self, participant: &AuthenticatedUser) -> Result<Vec<ChatThread>> {
        self.repo
            .list_threads(ThreadScope::for_participant(participant))
            .await
    }
}
