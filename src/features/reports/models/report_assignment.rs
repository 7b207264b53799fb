use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::ReportStatus;

/// Where a report sits in the hand-off chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStage {
    Unassigned,
    TechnicalStaffAssigned,
    ExternalMaintainerAssigned,
}

/// The assignment slots of a report, with the routing context (office, status)
/// the router needs to validate a hand-off.
///
/// Invariant: `external_maintainer_id` is only set when `technical_staff_id` is set.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ReportAssignment {
    pub report_id: i64,
    pub office_id: i64,
    pub status: ReportStatus,
    pub technical_staff_id: Option<i64>,
    pub external_maintainer_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl ReportAssignment {
    pub fn stage(&self) -> AssignmentStage {
        match (self.technical_staff_id, self.external_maintainer_id) {
            (None, _) => AssignmentStage::Unassigned,
            (Some(_), None) => AssignmentStage::TechnicalStaffAssigned,
            (Some(_), Some(_)) => AssignmentStage::ExternalMaintainerAssigned,
        }
    }

    /// Whether the operator is the technical staff or the external maintainer
    pub fn is_held_by(&self, operator_id: i64) -> bool {
        self.technical_staff_id == Some(operator_id)
            || self.external_maintainer_id == Some(operator_id)
    }
}
