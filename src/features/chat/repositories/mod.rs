mod pg_chat_repository;

pub use pg_chat_repository::PgChatRepository;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::chat::models::{
    ChatThread, Message, NewMessage, ReadWatermark, ThreadScope, WatermarkKey,
};

/// Storage of conversation messages and read watermarks
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Returns `None` when the report does not exist
    async fn insert_message(&self, message: &NewMessage) -> Result<Option<Message>>;

    /// Oldest first
    async fn list_messages(&self, report_id: i64) -> Result<Vec<Message>>;

    /// Threads in the scope, most recent activity first. Reports still pending approval
    /// or rejected are left out.
    async fn list_threads(&self, scope: ThreadScope) -> Result<Vec<ChatThread>>;

    /// Move the watermark to now, never backwards. `None` when the report does not exist.
    async fn upsert_watermark(&self, key: WatermarkKey) -> Result<Option<ReadWatermark>>;

    async fn unread_count(&self, key: WatermarkKey) -> Result<i64>;

    /// Sum of unread counts over the same thread set `list_threads` returns
    async fn total_unread_count(&self, scope: ThreadScope) -> Result<i64>;
}
