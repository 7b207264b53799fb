use async_trait::async_trait;
use sqlx::PgPool;

use super::OfficeRoster;
use crate::core::error::{AppError, Result};
use crate::features::auth::Role;
use crate::features::reports::models::ReportStatus;

pub struct PgOfficeRoster {
    pool: PgPool,
}

impl PgOfficeRoster {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn slot_column(role: Role) -> Result<&'static str> {
    match role {
        Role::TechnicalStaff => Ok("assigned_technical_staff_id"),
        Role::ExternalMaintainer => Ok("assigned_external_maintainer_id"),
        other => Err(AppError::InvalidArgument(format!(
            "Role {} is not routable",
            other
        ))),
    }
}

#[async_trait]
impl OfficeRoster for PgOfficeRoster {
    async fn pick_candidate(&self, office_id: i64, role: Role) -> Result<Option<i64>> {
        let column = slot_column(role)?;

        // Open load excludes reports that are already closed
        let sql = format!(
            r#"
            SELECT u.id
            FROM users u
            LEFT JOIN reports r
                ON r.{column} = u.id
               AND r.status_id NOT IN ($3, $4)
            WHERE u.office_id = $1 AND u.role = $2
            GROUP BY u.id
            ORDER BY COUNT(r.id) ASC, u.id ASC
            LIMIT 1
            "#
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(office_id)
            .bind(role.as_str())
            .bind(ReportStatus::Rejected)
            .bind(ReportStatus::Resolved)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to pick {} for office {}: {:?}", role, office_id, e);
                AppError::Database(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::repositories::{PgReportRepository, ReportRepository};
    use crate::shared::test_helpers::{new_report, seed_directory};

    async fn open_report(reports: &PgReportRepository, staff: i64) -> i64 {
        let id = reports.create(&new_report(5, 1, &[])).await.unwrap().id;
        reports.assign_technical_staff(id, staff).await.unwrap();
        id
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires DATABASE_URL pointing at a Postgres server"]
    async fn test_least_loaded_candidate(pool: PgPool) {
        seed_directory(&pool).await;
        let reports = PgReportRepository::new(pool.clone());
        let roster = PgOfficeRoster::new(pool);

        // Nobody carries work yet, so the lowest id wins
        assert_eq!(
            roster.pick_candidate(7, Role::TechnicalStaff).await.unwrap(),
            Some(42)
        );

        open_report(&reports, 42).await;
        assert_eq!(
            roster.pick_candidate(7, Role::TechnicalStaff).await.unwrap(),
            Some(43)
        );

        // Closed work does not count as load
        let closed = open_report(&reports, 43).await;
        open_report(&reports, 43).await;
        reports
            .set_status(closed, ReportStatus::Resolved, None)
            .await
            .unwrap();
        assert_eq!(
            roster.pick_candidate(7, Role::TechnicalStaff).await.unwrap(),
            Some(42)
        );

        assert_eq!(
            roster
                .pick_candidate(7, Role::ExternalMaintainer)
                .await
                .unwrap(),
            Some(60)
        );
        assert_eq!(
            roster.pick_candidate(8, Role::TechnicalStaff).await.unwrap(),
            None
        );
    }

    #[test]
    fn test_only_operator_slots_are_routable() {
        assert_eq!(
            slot_column(Role::TechnicalStaff).unwrap(),
            "assigned_technical_staff_id"
        );
        assert_eq!(
            slot_column(Role::ExternalMaintainer).unwrap(),
            "assigned_external_maintainer_id"
        );
        assert!(matches!(
            slot_column(Role::Citizen),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
