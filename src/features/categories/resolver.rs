use sqlx::PgConnection;

use crate::core::error::{AppError, Result};

/// Resolve the office responsible for a category.
///
/// Runs on the caller's connection so report creation can resolve inside its own
/// transaction. An unknown category fails with `NotFound`.
pub async fn resolve_office(conn: &mut PgConnection, category_id: i64) -> Result<i64> {
    let office_id = sqlx::query_scalar::<_, i64>("SELECT office_id FROM categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve office for category: {:?}", e);
            AppError::Database(e)
        })?;

    office_id.ok_or_else(|| AppError::NotFound(format!("Category {} not found", category_id)))
}
