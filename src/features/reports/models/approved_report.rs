use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Report, ReportStatus};

/// Public projection of an approved report.
///
/// Carries no citizen id at all; names are present only when the citizen did not ask to
/// stay anonymous. The stored report keeps the true creator either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApprovedReport {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category_id: i64,
    pub category_name: String,
    pub office_id: i64,
    pub office_name: String,
    pub status: ReportStatus,
    pub anonymous: bool,
    pub citizen_username: Option<String>,
    pub citizen_first_name: Option<String>,
    pub citizen_last_name: Option<String>,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ApprovedReport {
    fn from(r: Report) -> Self {
        let citizen = (!r.anonymous).then_some(r.citizen);

        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            latitude: r.latitude,
            longitude: r.longitude,
            category_id: r.category_id,
            category_name: r.category_name,
            office_id: r.office_id,
            office_name: r.office_name,
            status: r.status,
            anonymous: r.anonymous,
            citizen_username: citizen.as_ref().map(|c| c.username.clone()),
            citizen_first_name: citizen.as_ref().map(|c| c.first_name.clone()),
            citizen_last_name: citizen.map(|c| c.last_name),
            photo_urls: r.photos.into_iter().map(|p| p.url).collect(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
