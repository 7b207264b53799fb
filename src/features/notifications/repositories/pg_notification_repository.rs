use async_trait::async_trait;
use sqlx::PgPool;

use super::NotificationRepository;
use crate::core::error::{AppError, Result};
use crate::features::notifications::models::{NewNotification, Notification};

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, notification: &NewNotification) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (citizen_id, report_id, message)
            VALUES ($1, $2, $3)
            RETURNING id, citizen_id, report_id, message, sent_at, seen
            "#,
        )
        .bind(notification.citizen_id)
        .bind(notification.report_id)
        .bind(&notification.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create notification: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_for_citizen(&self, citizen_id: i64) -> Result<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, citizen_id, report_id, message, sent_at, seen
            FROM notifications
            WHERE citizen_id = $1
            ORDER BY sent_at DESC, id DESC
            "#,
        )
        .bind(citizen_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list notifications: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn mark_seen(&self, id: i64, citizen_id: i64) -> Result<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET seen = TRUE
            WHERE id = $1 AND citizen_id = $2
            RETURNING id, citizen_id, report_id, message, sent_at, seen
            "#,
        )
        .bind(id)
        .bind(citizen_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notification seen: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn mark_all_seen(&self, citizen_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET seen = TRUE WHERE citizen_id = $1 AND seen = FALSE",
        )
        .bind(citizen_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notifications seen: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::repositories::{PgReportRepository, ReportRepository};
    use crate::shared::test_helpers::{new_report, seed_directory};

    fn notice(citizen_id: i64, report_id: i64, message: &str) -> NewNotification {
        NewNotification {
            citizen_id,
            report_id,
            message: message.to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_seen_marking_is_owner_only(pool: PgPool) {
        seed_directory(&pool).await;
        let report = PgReportRepository::new(pool.clone())
            .create(&new_report(5, 1, &[]))
            .await
            .unwrap()
            .id;
        let repo = PgNotificationRepository::new(pool);

        let first = repo
            .insert(&notice(5, report, "Your report was assigned"))
            .await
            .unwrap();
        let second = repo
            .insert(&notice(5, report, "Your report is in progress"))
            .await
            .unwrap();
        assert!(!first.seen);

        let listed = repo.list_for_citizen(5).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        assert!(repo.mark_seen(first.id, 6).await.unwrap().is_none());
        let seen = repo.mark_seen(first.id, 5).await.unwrap().unwrap();
        assert!(seen.seen);

        assert_eq!(repo.mark_all_seen(5).await.unwrap(), 1);
        assert_eq!(repo.mark_all_seen(5).await.unwrap(), 0);
        assert!(repo.list_for_citizen(6).await.unwrap().is_empty());
    }
}
