use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::ReportRepository;
use crate::core::error::{AppError, Result};
use crate::features::categories::resolve_office;
use crate::features::reports::models::{
    NewReport, Report, ReportAssignment, ReportFilter, ReportPhoto, ReportRow, ReportStatus,
};

const REPORT_SELECT: &str = r#"
    SELECT
        r.id, r.title, r.description, r.latitude, r.longitude,
        r.category_id, c.name AS category_name,
        r.office_id, o.name AS office_name,
        r.status_id AS status, r.rejection_reason, r.anonymous,
        r.citizen_id,
        cu.username AS citizen_username,
        cu.first_name AS citizen_first_name,
        cu.last_name AS citizen_last_name,
        r.assigned_technical_staff_id AS technical_staff_id,
        ts.username AS technical_staff_username,
        ts.first_name AS technical_staff_first_name,
        ts.last_name AS technical_staff_last_name,
        r.assigned_external_maintainer_id AS external_maintainer_id,
        em.username AS external_maintainer_username,
        em.first_name AS external_maintainer_first_name,
        em.last_name AS external_maintainer_last_name,
        r.created_at, r.updated_at
    FROM reports r
    JOIN categories c ON c.id = r.category_id
    JOIN offices o ON o.id = r.office_id
    JOIN users cu ON cu.id = r.citizen_id
    LEFT JOIN users ts ON ts.id = r.assigned_technical_staff_id
    LEFT JOIN users em ON em.id = r.assigned_external_maintainer_id
"#;

const ASSIGNMENT_COLUMNS: &str = r#"
    id AS report_id, office_id, status_id AS status,
    assigned_technical_staff_id AS technical_staff_id,
    assigned_external_maintainer_id AS external_maintainer_id,
    updated_at
"#;

/// Postgres-backed report store
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn load_photos(
    conn: &mut PgConnection,
    report_ids: &[i64],
) -> Result<HashMap<i64, Vec<ReportPhoto>>> {
    if report_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let photos = sqlx::query_as::<_, ReportPhoto>(
        r#"
        SELECT id, report_id, position, url
        FROM report_photos
        WHERE report_id = ANY($1)
        ORDER BY report_id, position
        "#,
    )
    .bind(report_ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to load report photos: {:?}", e);
        AppError::Database(e)
    })?;

    let mut by_report: HashMap<i64, Vec<ReportPhoto>> = HashMap::new();
    for photo in photos {
        by_report.entry(photo.report_id).or_default().push(photo);
    }
    Ok(by_report)
}

async fn hydrate(conn: &mut PgConnection, rows: Vec<ReportRow>) -> Result<Vec<Report>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut photos = load_photos(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let report_photos = photos.remove(&row.id).unwrap_or_default();
            row.into_report(report_photos)
        })
        .collect())
}

async fn fetch_report(conn: &mut PgConnection, id: i64) -> Result<Option<Report>> {
    let sql = format!("{} WHERE r.id = $1", REPORT_SELECT);
    let row = sqlx::query_as::<_, ReportRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report: {:?}", e);
            AppError::Database(e)
        })?;

    match row {
        Some(row) => Ok(hydrate(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

fn approved_status_ids() -> Vec<i32> {
    ReportStatus::ALL
        .into_iter()
        .filter(|s| s.is_approved())
        .map(ReportStatus::id)
        .collect()
}

fn terminal_status_ids() -> Vec<i32> {
    ReportStatus::ALL
        .into_iter()
        .filter(|s| s.is_terminal())
        .map(ReportStatus::id)
        .collect()
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, draft: &NewReport) -> Result<Report> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin report transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let office_id = resolve_office(&mut tx, draft.category_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(msg) => AppError::InvalidCategory(msg),
                other => other,
            })?;

        let status_id = sqlx::query_scalar::<_, i32>("SELECT id FROM statuses WHERE name = $1")
            .bind(ReportStatus::PendingApproval.name())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to resolve initial report status: {:?}", e);
                AppError::Database(e)
            })?;

        let report_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reports (
                title, description, latitude, longitude,
                category_id, office_id, status_id, anonymous, citizen_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.latitude)
        .bind(draft.longitude)
        .bind(draft.category_id)
        .bind(office_id)
        .bind(status_id)
        .bind(draft.anonymous)
        .bind(draft.citizen_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create report: {:?}", e);
            AppError::Database(e)
        })?;

        for (position, url) in draft.photo_urls.iter().enumerate() {
            sqlx::query("INSERT INTO report_photos (report_id, position, url) VALUES ($1, $2, $3)")
                .bind(report_id)
                .bind(position as i32)
                .bind(url)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to attach report photo: {:?}", e);
                    AppError::Database(e)
                })?;
        }

        let report = fetch_report(&mut tx, report_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Report {} vanished mid-create", report_id)))?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report creation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created report {} for citizen {} (office {}, {} photos)",
            report.id,
            draft.citizen_id,
            office_id,
            report.photos.len()
        );

        Ok(report)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Report>> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        fetch_report(&mut conn, id).await
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;

        let rows = match filter {
            ReportFilter::All => {
                let sql = format!("{} ORDER BY r.created_at DESC", REPORT_SELECT);
                sqlx::query_as::<_, ReportRow>(&sql)
                    .fetch_all(&mut *conn)
                    .await
            }
            ReportFilter::Approved => {
                let sql = format!(
                    "{} WHERE r.status_id = ANY($1) ORDER BY r.created_at DESC",
                    REPORT_SELECT
                );
                sqlx::query_as::<_, ReportRow>(&sql)
                    .bind(approved_status_ids())
                    .fetch_all(&mut *conn)
                    .await
            }
            ReportFilter::AssignedTo(operator_id) => {
                let sql = format!(
                    r#"{} WHERE r.assigned_technical_staff_id = $1
                          OR r.assigned_external_maintainer_id = $1
                       ORDER BY r.updated_at DESC"#,
                    REPORT_SELECT
                );
                sqlx::query_as::<_, ReportRow>(&sql)
                    .bind(operator_id)
                    .fetch_all(&mut *conn)
                    .await
            }
            ReportFilter::CreatedBy(citizen_id) => {
                let sql = format!(
                    "{} WHERE r.citizen_id = $1 ORDER BY r.created_at DESC",
                    REPORT_SELECT
                );
                sqlx::query_as::<_, ReportRow>(&sql)
                    .bind(citizen_id)
                    .fetch_all(&mut *conn)
                    .await
            }
        }
        .map_err(|e| {
            tracing::error!("Failed to list reports ({:?}): {:?}", filter, e);
            AppError::Database(e)
        })?;

        hydrate(&mut conn, rows).await
    }

    async fn set_status(
        &self,
        id: i64,
        status: ReportStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Report>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin status transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let updated = sqlx::query(
            r#"
            UPDATE reports
            SET status_id = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(status.retained_rejection_reason(rejection_reason))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let report = fetch_report(&mut tx, id).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit status update: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Report {} status set to {}", id, status);
        Ok(report)
    }

    async fn find_assignment(&self, id: i64) -> Result<Option<ReportAssignment>> {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", ASSIGNMENT_COLUMNS);
        sqlx::query_as::<_, ReportAssignment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report assignment: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn assign_technical_staff(
        &self,
        id: i64,
        staff_id: i64,
    ) -> Result<Option<ReportAssignment>> {
        let sql = format!(
            r#"
            UPDATE reports
            SET assigned_technical_staff_id = $2,
                assigned_external_maintainer_id = CASE
                    WHEN assigned_technical_staff_id IS DISTINCT FROM $2 THEN NULL
                    ELSE assigned_external_maintainer_id
                END,
                status_id = CASE WHEN status_id = $3 THEN $4 ELSE status_id END,
                updated_at = NOW()
            WHERE id = $1 AND status_id <> ALL($5)
            RETURNING {}
            "#,
            ASSIGNMENT_COLUMNS
        );

        let assignment = sqlx::query_as::<_, ReportAssignment>(&sql)
            .bind(id)
            .bind(staff_id)
            .bind(ReportStatus::PendingApproval)
            .bind(ReportStatus::Assigned)
            .bind(terminal_status_ids())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign technical staff: {:?}", e);
                AppError::Database(e)
            })?;

        if assignment.is_some() {
            tracing::info!("Report {} assigned to technical staff {}", id, staff_id);
        }
        Ok(assignment)
    }

    async fn assign_external_maintainer(
        &self,
        id: i64,
        maintainer_id: i64,
    ) -> Result<Option<ReportAssignment>> {
        let sql = format!(
            r#"
            UPDATE reports
            SET assigned_external_maintainer_id = $2, updated_at = NOW()
            WHERE id = $1
              AND assigned_technical_staff_id IS NOT NULL
              AND status_id <> ALL($3)
            RETURNING {}
            "#,
            ASSIGNMENT_COLUMNS
        );

        let assignment = sqlx::query_as::<_, ReportAssignment>(&sql)
            .bind(id)
            .bind(maintainer_id)
            .bind(terminal_status_ids())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign external maintainer: {:?}", e);
                AppError::Database(e)
            })?;

        if assignment.is_some() {
            tracing::info!(
                "Report {} assigned to external maintainer {}",
                id,
                maintainer_id
            );
        }
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::ApprovedReport;
    use crate::shared::test_helpers::{new_report, seed_directory};

    async fn count(pool: &PgPool, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn seeded(pool: PgPool) -> PgReportRepository {
        seed_directory(&pool).await;
        PgReportRepository::new(pool)
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_create_resolves_office_and_keeps_photo_order(pool: PgPool) {
        let repo = seeded(pool).await;

        let report = repo
            .create(&new_report(
                5,
                2,
                &["https://cdn.example.org/a.jpg", "https://cdn.example.org/b.jpg"],
            ))
            .await
            .unwrap();

        assert_eq!(report.office_id, 7);
        assert_eq!(report.office_name, "Public Works");
        assert_eq!(report.status, ReportStatus::PendingApproval);
        assert_eq!(report.citizen.username, "lucia");
        let urls: Vec<&str> = report.photos.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://cdn.example.org/a.jpg", "https://cdn.example.org/b.jpg"]
        );
        assert_eq!(report.photos[1].position, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_create_rolls_back_when_a_photo_fails(pool: PgPool) {
        let repo = seeded(pool.clone()).await;

        // The second photo violates the non-empty url check
        let result = repo
            .create(&new_report(5, 1, &["https://cdn.example.org/a.jpg", ""]))
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
        assert_eq!(count(&pool, "reports").await, 0);
        assert_eq!(count(&pool, "report_photos").await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_create_with_unknown_category(pool: PgPool) {
        let repo = seeded(pool.clone()).await;

        let result = repo.create(&new_report(5, 99, &[])).await;

        assert!(matches!(result, Err(AppError::InvalidCategory(_))));
        assert_eq!(count(&pool, "reports").await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_rejection_reason_cleared_by_next_status(pool: PgPool) {
        let repo = seeded(pool).await;
        let id = repo.create(&new_report(5, 1, &[])).await.unwrap().id;

        let rejected = repo
            .set_status(id, ReportStatus::Rejected, Some("insufficient detail"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            rejected.rejection_reason.as_deref(),
            Some("insufficient detail")
        );

        let reopened = repo
            .set_status(id, ReportStatus::Assigned, Some("ignored"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reopened.status, ReportStatus::Assigned);
        assert_eq!(reopened.rejection_reason, None);

        assert!(repo
            .set_status(id + 1000, ReportStatus::Resolved, None)
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_approved_listing_is_anonymous_safe(pool: PgPool) {
        let repo = seeded(pool).await;
        let mut hidden = new_report(5, 1, &[]);
        hidden.anonymous = true;
        let hidden = repo.create(&hidden).await.unwrap().id;
        let named = repo.create(&new_report(6, 1, &[])).await.unwrap().id;
        let pending = repo.create(&new_report(6, 1, &[])).await.unwrap().id;
        repo.set_status(hidden, ReportStatus::InProgress, None)
            .await
            .unwrap();
        repo.set_status(named, ReportStatus::Assigned, None)
            .await
            .unwrap();

        let approved: Vec<ApprovedReport> = repo
            .list(ReportFilter::Approved)
            .await
            .unwrap()
            .into_iter()
            .map(ApprovedReport::from)
            .collect();

        assert_eq!(approved.len(), 2);
        assert!(approved.iter().all(|r| r.id != pending));

        let anonymous = approved.iter().find(|r| r.id == hidden).unwrap();
        assert_eq!(anonymous.citizen_username, None);
        assert_eq!(anonymous.citizen_first_name, None);
        let json = serde_json::to_value(anonymous).unwrap();
        assert!(json.get("citizen_id").is_none());

        let public = approved.iter().find(|r| r.id == named).unwrap();
        assert_eq!(public.citizen_username.as_deref(), Some("paolo"));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_assignment_writes(pool: PgPool) {
        let repo = seeded(pool).await;
        let id = repo.create(&new_report(5, 1, &[])).await.unwrap().id;

        // Maintainer needs technical staff first
        assert!(repo
            .assign_external_maintainer(id, 60)
            .await
            .unwrap()
            .is_none());

        let staffed = repo.assign_technical_staff(id, 42).await.unwrap().unwrap();
        assert_eq!(staffed.status, ReportStatus::Assigned);
        assert_eq!(staffed.office_id, 7);

        let refined = repo
            .assign_external_maintainer(id, 60)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refined.technical_staff_id, Some(42));
        assert_eq!(refined.external_maintainer_id, Some(60));

        // Same staff keeps the maintainer, a new one drops it
        let same = repo.assign_technical_staff(id, 42).await.unwrap().unwrap();
        assert_eq!(same.external_maintainer_id, Some(60));
        let moved = repo.assign_technical_staff(id, 43).await.unwrap().unwrap();
        assert_eq!(moved.technical_staff_id, Some(43));
        assert_eq!(moved.external_maintainer_id, None);

        let assigned = repo.list(ReportFilter::AssignedTo(43)).await.unwrap();
        assert_eq!(assigned.len(), 1);
        assert!(repo
            .list(ReportFilter::AssignedTo(42))
            .await
            .unwrap()
            .is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_terminal_reports_refuse_assignment(pool: PgPool) {
        let repo = seeded(pool).await;
        let resolved = repo.create(&new_report(5, 1, &[])).await.unwrap().id;
        repo.assign_technical_staff(resolved, 42).await.unwrap();
        repo.set_status(resolved, ReportStatus::Resolved, None)
            .await
            .unwrap();
        let rejected = repo.create(&new_report(5, 1, &[])).await.unwrap().id;
        repo.set_status(rejected, ReportStatus::Rejected, Some("duplicate"))
            .await
            .unwrap();

        assert!(repo
            .assign_technical_staff(rejected, 42)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .assign_external_maintainer(resolved, 60)
            .await
            .unwrap()
            .is_none());

        let current = repo.find_assignment(resolved).await.unwrap().unwrap();
        assert_eq!(current.status, ReportStatus::Resolved);
        assert_eq!(current.external_maintainer_id, None);
        let current = repo.find_assignment(rejected).await.unwrap().unwrap();
        assert_eq!(current.technical_staff_id, None);
    }
}
