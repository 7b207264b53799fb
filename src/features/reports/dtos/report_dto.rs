use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::reports::models::{
    AssignmentStage, NewReport, PersonSummary, Report, ReportAssignment, ReportStatus,
};
use crate::shared::constants::{
    MAX_REJECTION_REASON_LENGTH, MAX_REPORT_DESCRIPTION_LENGTH, MAX_REPORT_PHOTOS,
    MAX_REPORT_TITLE_LENGTH,
};

/// Request DTO for submitting a report
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReportDto {
    #[validate(length(min = 1, max = MAX_REPORT_TITLE_LENGTH))]
    pub title: String,

    #[validate(length(min = 1, max = MAX_REPORT_DESCRIPTION_LENGTH))]
    pub description: String,

    /// WGS84 degrees; range-checked on submission
    pub latitude: f64,

    pub longitude: f64,

    #[validate(range(min = 1))]
    pub category_id: i64,

    /// Hide the citizen's name from the public map
    #[serde(default)]
    pub anonymous: bool,

    /// Photo URLs in display order
    #[serde(default)]
    #[validate(length(max = MAX_REPORT_PHOTOS))]
    pub photo_urls: Vec<String>,
}

impl CreateReportDto {
    pub fn into_new_report(self, citizen_id: i64) -> NewReport {
        NewReport {
            citizen_id,
            title: self.title,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            category_id: self.category_id,
            anonymous: self.anonymous,
            photo_urls: self.photo_urls,
        }
    }
}

/// Request DTO for changing a report's status
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,

    /// Required when rejecting; discarded for every other status
    #[validate(length(max = MAX_REJECTION_REASON_LENGTH))]
    pub rejection_reason: Option<String>,
}

/// Reference to a named catalog entry (category, office)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NamedRefDto {
    pub id: i64,
    pub name: String,
}

/// Response DTO for a report as seen by its participants
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category: NamedRefDto,
    pub office: NamedRefDto,
    pub status: ReportStatus,
    pub rejection_reason: Option<String>,
    pub anonymous: bool,
    pub citizen: PersonSummary,
    pub technical_staff: Option<PersonSummary>,
    pub external_maintainer: Option<PersonSummary>,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            latitude: r.latitude,
            longitude: r.longitude,
            category: NamedRefDto {
                id: r.category_id,
                name: r.category_name,
            },
            office: NamedRefDto {
                id: r.office_id,
                name: r.office_name,
            },
            status: r.status,
            rejection_reason: r.rejection_reason,
            anonymous: r.anonymous,
            citizen: r.citizen,
            technical_staff: r.technical_staff,
            external_maintainer: r.external_maintainer,
            photo_urls: r.photos.into_iter().map(|p| p.url).collect(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Response DTO for the assignment slots of a report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponseDto {
    pub report_id: i64,
    pub office_id: i64,
    pub status: ReportStatus,
    pub stage: AssignmentStage,
    pub technical_staff_id: Option<i64>,
    pub external_maintainer_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReportAssignment> for AssignmentResponseDto {
    fn from(a: ReportAssignment) -> Self {
        Self {
            report_id: a.report_id,
            office_id: a.office_id,
            status: a.status,
            stage: a.stage(),
            technical_staff_id: a.technical_staff_id,
            external_maintainer_id: a.external_maintainer_id,
            updated_at: a.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(photos: usize) -> CreateReportDto {
        CreateReportDto {
            title: "Broken streetlight".to_string(),
            description: "Dark corner near the school".to_string(),
            latitude: 45.07,
            longitude: 7.68,
            category_id: 1,
            anonymous: false,
            photo_urls: vec!["https://cdn.example.org/p.jpg".to_string(); photos],
        }
    }

    #[test]
    fn test_create_report_validation() {
        assert!(body(1).validate().is_ok());
        assert!(body(MAX_REPORT_PHOTOS as usize + 1).validate().is_err());

        let mut no_title = body(0);
        no_title.title = String::new();
        assert!(no_title.validate().is_err());

        let mut bad_category = body(0);
        bad_category.category_id = 0;
        assert!(bad_category.validate().is_err());
    }

    #[test]
    fn test_text_limits_are_inclusive() {
        let mut longest = body(0);
        longest.title = "t".repeat(MAX_REPORT_TITLE_LENGTH as usize);
        longest.description = "d".repeat(MAX_REPORT_DESCRIPTION_LENGTH as usize);
        assert!(longest.validate().is_ok());

        let mut long_title = body(0);
        long_title.title = "t".repeat(MAX_REPORT_TITLE_LENGTH as usize + 1);
        assert!(long_title.validate().is_err());

        let mut long_description = body(0);
        long_description.description = "d".repeat(MAX_REPORT_DESCRIPTION_LENGTH as usize + 1);
        assert!(long_description.validate().is_err());

        let reason = |len: usize| UpdateReportStatusDto {
            status: ReportStatus::Rejected,
            rejection_reason: Some("r".repeat(len)),
        };
        assert!(reason(MAX_REJECTION_REASON_LENGTH as usize).validate().is_ok());
        assert!(reason(MAX_REJECTION_REASON_LENGTH as usize + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_status_body_accepts_catalog_names() {
        let dto: UpdateReportStatusDto = serde_json::from_str(
            r#"{"status":"Rejected","rejection_reason":"insufficient detail"}"#,
        )
        .unwrap();
        assert_eq!(dto.status, ReportStatus::Rejected);

        assert!(serde_json::from_str::<UpdateReportStatusDto>(r#"{"status":"Closed"}"#).is_err());
    }
}
