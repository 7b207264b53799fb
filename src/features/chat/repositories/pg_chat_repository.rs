use async_trait::async_trait;
use sqlx::PgPool;

use super::ChatRepository;
use crate::core::error::{AppError, Result};
use crate::features::chat::models::{
    ChatThread, ChatThreadRow, Message, NewMessage, ReadWatermark, ThreadScope, WatermarkKey,
};
use crate::features::reports::models::ReportStatus;

/// Unread messages of report `r` for the viewer bound at $1 (id), $2 (role) and
/// $3 (the sender types that count as the other side).
const UNREAD_SUBQUERY: &str = r#"
    SELECT COUNT(*)
    FROM messages m
    LEFT JOIN read_watermarks w
        ON w.report_id = m.report_id
       AND w.participant_id = $1
       AND w.participant_role = $2
    WHERE m.report_id = r.id
      AND m.sender_type::text = ANY($3)
      AND m.sent_at > COALESCE(w.last_read_at, 'epoch'::timestamptz)
"#;

pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn chat_listed_status_ids() -> Vec<i32> {
    ReportStatus::ALL
        .into_iter()
        .filter(|s| s.is_listed_in_chat())
        .map(ReportStatus::id)
        .collect()
}

fn scope_column(scope: ThreadScope) -> &'static str {
    match scope {
        ThreadScope::Citizen(_) => "citizen_id",
        ThreadScope::TechnicalStaff(_) => "assigned_technical_staff_id",
        ThreadScope::ExternalMaintainer(_) => "assigned_external_maintainer_id",
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn insert_message(&self, message: &NewMessage) -> Result<Option<Message>> {
        let stored = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (report_id, sender_type, sender_id, content)
            SELECT $1, $2, $3, $4
            WHERE EXISTS (SELECT 1 FROM reports WHERE id = $1)
            RETURNING id, report_id, sender_type, sender_id, content, sent_at
            "#,
        )
        .bind(message.report_id)
        .bind(message.sender_type)
        .bind(message.sender_id)
        .bind(&message.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to append message: {:?}", e);
            AppError::Database(e)
        })?;

        if let Some(m) = &stored {
            tracing::info!(
                "Appended {} message {} to report {}",
                m.sender_type,
                m.id,
                m.report_id
            );
        }
        Ok(stored)
    }

    async fn list_messages(&self, report_id: i64) -> Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, report_id, sender_type, sender_id, content, sent_at
            FROM messages
            WHERE report_id = $1
            ORDER BY sent_at ASC, id ASC
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list messages: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_threads(&self, scope: ThreadScope) -> Result<Vec<ChatThread>> {
        let role = scope.participant_role();
        let sql = format!(
            r#"
            SELECT
                r.id AS report_id,
                r.title AS report_title,
                r.status_id AS status,
                lm.content AS last_message_content,
                lm.sender_type AS last_message_sender_type,
                lm.sent_at AS last_message_sent_at,
                (SELECT COUNT(*) FROM messages mc WHERE mc.report_id = r.id) AS message_count,
                COALESCE(lm.sent_at, r.created_at) AS last_activity_at,
                ({unread}) AS unread_count
            FROM reports r
            LEFT JOIN LATERAL (
                SELECT content, sender_type, sent_at
                FROM messages
                WHERE report_id = r.id
                ORDER BY sent_at DESC, id DESC
                LIMIT 1
            ) lm ON TRUE
            WHERE r.{column} = $1
              AND r.status_id = ANY($4)
            ORDER BY last_activity_at DESC, r.id DESC
            "#,
            unread = UNREAD_SUBQUERY,
            column = scope_column(scope),
        );

        let rows = sqlx::query_as::<_, ChatThreadRow>(&sql)
            .bind(scope.participant_id())
            .bind(role)
            .bind(role.counterpart_senders())
            .bind(chat_listed_status_ids())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list chat threads ({:?}): {:?}", scope, e);
                AppError::Database(e)
            })?;

        Ok(rows.into_iter().map(ChatThread::from).collect())
    }

    async fn upsert_watermark(&self, key: WatermarkKey) -> Result<Option<ReadWatermark>> {
        sqlx::query_as::<_, ReadWatermark>(
            r#"
            INSERT INTO read_watermarks (participant_role, participant_id, report_id, last_read_at)
            SELECT $1, $2, $3, NOW()
            WHERE EXISTS (SELECT 1 FROM reports WHERE id = $3)
            ON CONFLICT (participant_role, participant_id, report_id)
            DO UPDATE SET last_read_at = GREATEST(read_watermarks.last_read_at, EXCLUDED.last_read_at)
            RETURNING participant_role, participant_id, report_id, last_read_at
            "#,
        )
        .bind(key.role)
        .bind(key.participant_id)
        .bind(key.report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark report read: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn unread_count(&self, key: WatermarkKey) -> Result<i64> {
        let sql = format!(
            "SELECT ({}) FROM reports r WHERE r.id = $4",
            UNREAD_SUBQUERY
        );

        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(key.participant_id)
            .bind(key.role)
            .bind(key.role.counterpart_senders())
            .bind(key.report_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count unread messages: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(count.unwrap_or(0))
    }

    async fn total_unread_count(&self, scope: ThreadScope) -> Result<i64> {
        let role = scope.participant_role();
        let sql = format!(
            r#"
            SELECT COALESCE(SUM(({unread})), 0)::BIGINT
            FROM reports r
            WHERE r.{column} = $1
              AND r.status_id = ANY($4)
            "#,
            unread = UNREAD_SUBQUERY,
            column = scope_column(scope),
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(scope.participant_id())
            .bind(role)
            .bind(role.counterpart_senders())
            .bind(chat_listed_status_ids())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to total unread messages ({:?}): {:?}", scope, e);
                AppError::Database(e)
            })
    }
}
