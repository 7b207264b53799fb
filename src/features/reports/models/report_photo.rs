use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Database model for a photo captured with the report, kept in submission order
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct ReportPhoto {
    pub id: i64,
    pub report_id: i64,
    pub position: i32,
    pub url: String,
}
