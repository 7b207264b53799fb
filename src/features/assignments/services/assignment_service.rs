use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::assignments::repositories::OfficeRoster;
use crate::features::auth::{AuthenticatedUser, Role};
use crate::features::reports::models::{AssignmentStage, ReportAssignment};
use crate::features::reports::repositories::ReportRepository;

const STAFF_ASSIGNERS: [Role; 2] = [Role::MunicipalReviewer, Role::Administrator];
const MAINTAINER_ASSIGNERS: [Role; 2] = [Role::TechnicalStaff, Role::Administrator];

/// Routes reports along the hand-off chain: office, then technical staff, then an
/// external maintainer. Every check runs before the write.
pub struct AssignmentService {
    reports: Arc<dyn ReportRepository>,
    roster: Arc<dyn OfficeRoster>,
}

fn require_operator_id(operator_id: i64) -> Result<()> {
    if operator_id <= 0 {
        return Err(AppError::InvalidArgument(
            "Operator id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

fn require_role(actor: &AuthenticatedUser, allowed: &[Role], hand_off: &str) -> Result<()> {
    if !actor.has_any_role(allowed) {
        return Err(AppError::Forbidden(format!(
            "Role {} cannot assign {}",
            actor.role, hand_off
        )));
    }
    Ok(())
}

fn not_found(report_id: i64) -> AppError {
    AppError::NotFound(format!("Report {} not found", report_id))
}

impl AssignmentService {
    pub fn new(reports: Arc<dyn ReportRepository>, roster: Arc<dyn OfficeRoster>) -> Self {
        Self { reports, roster }
    }

    /// Current slots of a report that may still be routed
    async fn routable(&self, report_id: i64) -> Result<ReportAssignment> {
        let current = self
            .reports
            .find_assignment(report_id)
            .await?
            .ok_or_else(|| not_found(report_id))?;

        if current.status.is_terminal() {
            return Err(AppError::InvalidArgument(format!(
                "Report {} is {} and cannot be routed",
                report_id, current.status
            )));
        }

        Ok(current)
    }

    /// Technical staff may only pass on work that is theirs
    fn check_maintainer_hand_off(
        actor: &AuthenticatedUser,
        current: &ReportAssignment,
    ) -> Result<()> {
        if current.stage() == AssignmentStage::Unassigned {
            return Err(AppError::InvalidArgument(format!(
                "Report {} has no technical staff yet",
                current.report_id
            )));
        }
        if actor.has_role(Role::TechnicalStaff) && current.technical_staff_id != Some(actor.id) {
            return Err(AppError::Forbidden(format!(
                "Report {} is not assigned to you",
                current.report_id
            )));
        }
        Ok(())
    }

    /// Explains a write the store refused because the report changed after the checks
    async fn refused(&self, report_id: i64) -> AppError {
        match self.routable(report_id).await {
            Err(e) => e,
            Ok(current) => AppError::InvalidArgument(format!(
                "Report {} has no technical staff yet",
                current.report_id
            )),
        }
    }

    async fn write_technical_staff(
        &self,
        report_id: i64,
        staff_id: i64,
    ) -> Result<ReportAssignment> {
        match self
            .reports
            .assign_technical_staff(report_id, staff_id)
            .await?
        {
            Some(assignment) => Ok(assignment),
            None => Err(self.refused(report_id).await),
        }
    }

    async fn write_external_maintainer(
        &self,
        report_id: i64,
        maintainer_id: i64,
    ) -> Result<ReportAssignment> {
        match self
            .reports
            .assign_external_maintainer(report_id, maintainer_id)
            .await?
        {
            Some(assignment) => Ok(assignment),
            None => Err(self.refused(report_id).await),
        }
    }

    async fn pick(&self, current: &ReportAssignment, role: Role) -> Result<i64> {
        self.roster
            .pick_candidate(current.office_id, role)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No {} available in office {}",
                    role, current.office_id
                ))
            })
    }

    /// First hand-off. A report still pending approval becomes Assigned. Handing the report
    /// to a different staff member clears the external maintainer picked by the previous one.
    pub async fn assign_technical_staff(
        &self,
        actor: &AuthenticatedUser,
        report_id: i64,
        staff_id: i64,
    ) -> Result<ReportAssignment> {
        require_operator_id(staff_id)?;
        require_role(actor, &STAFF_ASSIGNERS, "technical staff")?;
        self.routable(report_id).await?;

        self.write_technical_staff(report_id, staff_id).await
    }

    pub async fn auto_assign_technical_staff(
        &self,
        actor: &AuthenticatedUser,
        report_id: i64,
    ) -> Result<ReportAssignment> {
        require_role(actor, &STAFF_ASSIGNERS, "technical staff")?;
        let current = self.routable(report_id).await?;
        let staff_id = self.pick(&current, Role::TechnicalStaff).await?;

        tracing::info!(
            "Auto-routing report {} to technical staff {}",
            report_id,
            staff_id
        );
        self.write_technical_staff(report_id, staff_id).await
    }

    /// Second hand-off. The technical-staff slot is kept.
    pub async fn assign_external_maintainer(
        &self,
        actor: &AuthenticatedUser,
        report_id: i64,
        maintainer_id: i64,
    ) -> Result<ReportAssignment> {
        require_operator_id(maintainer_id)?;
        require_role(actor, &MAINTAINER_ASSIGNERS, "an external maintainer")?;
        let current = self.routable(report_id).await?;
        Self::check_maintainer_hand_off(actor, &current)?;

        self.write_external_maintainer(report_id, maintainer_id)
            .await
    }

    pub async fn auto_assign_external_maintainer(
        &self,
        actor: &AuthenticatedUser,
        report_id: i64,
    ) -> Result<ReportAssignment> {
        require_role(actor, &MAINTAINER_ASSIGNERS, "an external maintainer")?;
        let current = self.routable(report_id).await?;
        Self::check_maintainer_hand_off(actor, &current)?;
        let maintainer_id = self.pick(&current, Role::ExternalMaintainer).await?;

        tracing::info!(
            "Auto-routing report {} to external maintainer {}",
            report_id,
            maintainer_id
        );
        self.write_external_maintainer(report_id, maintainer_id)
            .await
    }
}
