use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

use super::{ReportAssignment, ReportPhoto};
use crate::core::error::AppError;

/// Report status with the fixed catalog identifiers stored in `statuses.id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[repr(i32)]
pub enum ReportStatus {
    PendingApproval = 1,
    Assigned = 2,
    InProgress = 3,
    Suspended = 4,
    Rejected = 5,
    Resolved = 6,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 6] = [
        ReportStatus::PendingApproval,
        ReportStatus::Assigned,
        ReportStatus::InProgress,
        ReportStatus::Suspended,
        ReportStatus::Rejected,
        ReportStatus::Resolved,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    /// Catalog name (`statuses.name`)
    pub fn name(self) -> &'static str {
        match self {
            ReportStatus::PendingApproval => "PendingApproval",
            ReportStatus::Assigned => "Assigned",
            ReportStatus::InProgress => "InProgress",
            ReportStatus::Suspended => "Suspended",
            ReportStatus::Rejected => "Rejected",
            ReportStatus::Resolved => "Resolved",
        }
    }

    /// Human wording for announcements
    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::PendingApproval => "pending approval",
            ReportStatus::Assigned => "assigned",
            ReportStatus::InProgress => "in progress",
            ReportStatus::Suspended => "suspended",
            ReportStatus::Rejected => "rejected",
            ReportStatus::Resolved => "resolved",
        }
    }

    /// Statuses visible on the public map
    pub fn is_approved(self) -> bool {
        matches!(
            self,
            ReportStatus::Assigned | ReportStatus::InProgress | ReportStatus::Suspended
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Rejected | ReportStatus::Resolved)
    }

    /// Statuses whose conversations appear in thread listings and unread totals
    pub fn is_listed_in_chat(self) -> bool {
        !matches!(self, ReportStatus::PendingApproval | ReportStatus::Rejected)
    }

    /// The rejection reason is kept only while the report is rejected
    pub fn retained_rejection_reason(self, reason: Option<&str>) -> Option<String> {
        match self {
            ReportStatus::Rejected => reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for ReportStatus {
    type Error = AppError;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.id() == id)
            .ok_or_else(|| AppError::InvalidArgument(format!("Unknown status id {}", id)))
    }
}

/// Identity fields of a user joined onto a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PersonSummary {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Fully hydrated report: the row plus its joined reference data and photos.
///
/// `citizen` always holds the true creator. Anonymity is applied by the read projections.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
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
    pub rejection_reason: Option<String>,
    pub anonymous: bool,
    pub citizen: PersonSummary,
    pub assignment: ReportAssignment,
    pub technical_staff: Option<PersonSummary>,
    pub external_maintainer: Option<PersonSummary>,
    pub photos: Vec<ReportPhoto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn citizen_id(&self) -> i64 {
        self.citizen.id
    }
}

/// Flat row returned by the hydration query, before photos are attached
#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
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
    pub rejection_reason: Option<String>,
    pub anonymous: bool,
    pub citizen_id: i64,
    pub citizen_username: String,
    pub citizen_first_name: String,
    pub citizen_last_name: String,
    pub technical_staff_id: Option<i64>,
    pub technical_staff_username: Option<String>,
    pub technical_staff_first_name: Option<String>,
    pub technical_staff_last_name: Option<String>,
    pub external_maintainer_id: Option<i64>,
    pub external_maintainer_username: Option<String>,
    pub external_maintainer_first_name: Option<String>,
    pub external_maintainer_last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn person(
    id: Option<i64>,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Option<PersonSummary> {
    Some(PersonSummary {
        id: id?,
        username: username.unwrap_or_default(),
        first_name: first_name.unwrap_or_default(),
        last_name: last_name.unwrap_or_default(),
    })
}

impl ReportRow {
    pub fn into_report(self, photos: Vec<ReportPhoto>) -> Report {
        let assignment = ReportAssignment {
            report_id: self.id,
            office_id: self.office_id,
            status: self.status,
            technical_staff_id: self.technical_staff_id,
            external_maintainer_id: self.external_maintainer_id,
            updated_at: self.updated_at,
        };

        Report {
            id: self.id,
            title: self.title,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            category_id: self.category_id,
            category_name: self.category_name,
            office_id: self.office_id,
            office_name: self.office_name,
            status: self.status,
            rejection_reason: self.rejection_reason,
            anonymous: self.anonymous,
            citizen: PersonSummary {
                id: self.citizen_id,
                username: self.citizen_username,
                first_name: self.citizen_first_name,
                last_name: self.citizen_last_name,
            },
            assignment,
            technical_staff: person(
                self.technical_staff_id,
                self.technical_staff_username,
                self.technical_staff_first_name,
                self.technical_staff_last_name,
            ),
            external_maintainer: person(
                self.external_maintainer_id,
                self.external_maintainer_username,
                self.external_maintainer_first_name,
                self.external_maintainer_last_name,
            ),
            photos,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Data for submitting a new report
#[derive(Debug, Clone)]
pub struct NewReport {
    pub citizen_id: i64,
    pub title: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub category_id: i64,
    pub anonymous: bool,
    pub photo_urls: Vec<String>,
}

/// Row selection for the report read projections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter {
    All,
    /// Assigned, InProgress or Suspended
    Approved,
    /// Reports where the operator holds either assignment slot
    AssignedTo(i64),
    CreatedBy(i64),
}

#[cfg(test)]
impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        match *self {
            ReportFilter::All => true,
            ReportFilter::Approved => report.status.is_approved(),
            ReportFilter::AssignedTo(id) => report.assignment.is_held_by(id),
            ReportFilter::CreatedBy(id) => report.citizen.id == id,
        }
    }
}
