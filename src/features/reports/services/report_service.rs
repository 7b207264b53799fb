use std::sync::Arc;

use validator::ValidateUrl;

use crate::core::error::{AppError, Result};
use crate::features::auth::{AuthenticatedUser, Role};
use crate::features::chat::services::ConversationService;
use crate::features::notifications::services::{NotificationService, PushChannel};
use crate::features::reports::models::{
    ApprovedReport, NewReport, Report, ReportFilter, ReportStatus,
};
use crate::features::reports::repositories::ReportRepository;
use crate::shared::constants::{
    MAX_REJECTION_REASON_LENGTH, MAX_REPORT_DESCRIPTION_LENGTH, MAX_REPORT_PHOTOS,
    MAX_REPORT_TITLE_LENGTH,
};

/// Statuses a field operator may report on work assigned to them
const FIELD_STATUSES: [ReportStatus; 3] = [
    ReportStatus::InProgress,
    ReportStatus::Suspended,
    ReportStatus::Resolved,
];

/// Service for report operations
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    conversations: Arc<ConversationService>,
    notifications: Arc<NotificationService>,
    push: Option<Arc<dyn PushChannel>>,
}

fn validate_draft(draft: &NewReport) -> Result<()> {
    if draft.citizen_id <= 0 || draft.category_id <= 0 {
        return Err(AppError::InvalidArgument(
            "Citizen and category ids must be positive".to_string(),
        ));
    }

    let title = draft.title.trim();
    if title.is_empty() || title.chars().count() as u64 > MAX_REPORT_TITLE_LENGTH {
        return Err(AppError::InvalidArgument(format!(
            "Title must be between 1 and {} characters",
            MAX_REPORT_TITLE_LENGTH
        )));
    }

    let description = draft.description.trim();
    if description.is_empty()
        || description.chars().count() as u64 > MAX_REPORT_DESCRIPTION_LENGTH
    {
        return Err(AppError::InvalidArgument(format!(
            "Description must be between 1 and {} characters",
            MAX_REPORT_DESCRIPTION_LENGTH
        )));
    }

    if !(-90.0..=90.0).contains(&draft.latitude) || !(-180.0..=180.0).contains(&draft.longitude)
    {
        return Err(AppError::InvalidArgument(
            "Coordinates are out of range".to_string(),
        ));
    }

    if draft.photo_urls.len() as u64 > MAX_REPORT_PHOTOS {
        return Err(AppError::InvalidArgument(format!(
            "At most {} photos can be attached",
            MAX_REPORT_PHOTOS
        )));
    }
    if let Some(bad) = draft.photo_urls.iter().find(|url| !url.validate_url()) {
        return Err(AppError::InvalidArgument(format!(
            "Invalid photo URL: {}",
            bad
        )));
    }

    Ok(())
}

/// Text posted to the conversation and sent to the citizen after a status change
fn status_announcement(report: &Report) -> String {
    match (&report.status, &report.rejection_reason) {
        (ReportStatus::Rejected, Some(reason)) => format!(
            "Report \"{}\" was rejected: {}",
            report.title, reason
        ),
        (status, _) => format!("Report \"{}\" is now {}", report.title, status.label()),
    }
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        conversations: Arc<ConversationService>,
        notifications: Arc<NotificationService>,
        push: Option<Arc<dyn PushChannel>>,
    ) -> Self {
        Self {
            reports,
            conversations,
            notifications,
            push,
        }
    }

    /// Submit a new report. It starts in PendingApproval in the office owning its category.
    pub async fn create(&self, draft: &NewReport) -> Result<Report> {
        validate_draft(draft)?;

        let draft = NewReport {
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            ..draft.clone()
        };

        self.reports.create(&draft).await
    }

    /// Plain status write. `None` when no report has this id.
    pub async fn set_status(
        &self,
        report_id: i64,
        status: ReportStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Report>> {
        self.reports
            .set_status(report_id, status, rejection_reason)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<Report>> {
        self.reports.list(ReportFilter::All).await
    }

    /// Public projection: no citizen id, names only for non-anonymous reports
    pub async fn list_approved(&self) -> Result<Vec<ApprovedReport>> {
        let reports = self.reports.list(ReportFilter::Approved).await?;
        Ok(reports.into_iter().map(ApprovedReport::from).collect())
    }

    pub async fn list_assigned_to(&self, operator_id: i64) -> Result<Vec<Report>> {
        self.reports.list(ReportFilter::AssignedTo(operator_id)).await
    }

    pub async fn list_by_citizen(&self, citizen_id: i64) -> Result<Vec<Report>> {
        self.reports.list(ReportFilter::CreatedBy(citizen_id)).await
    }

    /// Load a report the user takes part in: its creator, an assigned operator,
    /// or a reviewer/administrator.
    pub async fn get_for(&self, user: &AuthenticatedUser, report_id: i64) -> Result<Report> {
        let report = self
            .reports
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        let is_participant = user.has_oversight_access()
            || match user.role {
                Role::Citizen => report.citizen_id() == user.id,
                _ => report.assignment.is_held_by(user.id),
            };

        if !is_participant {
            return Err(AppError::Forbidden(format!(
                "Not a participant of report {}",
                report_id
            )));
        }

        Ok(report)
    }

    /// Status change on behalf of an operator.
    ///
    /// Reviewers and administrators may set any status. Technical staff and external
    /// maintainers may only move their own assigned work to InProgress, Suspended or
    /// Resolved. The announcement and citizen notification run after the write and
    /// cannot undo it.
    pub async fn change_status(
        &self,
        actor: &AuthenticatedUser,
        report_id: i64,
        status: ReportStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Report> {
        if !actor.is_operator() {
            return Err(AppError::Forbidden(
                "Citizens cannot change report status".to_string(),
            ));
        }

        let reason = rejection_reason.map(str::trim).filter(|r| !r.is_empty());
        if status == ReportStatus::Rejected && reason.is_none() {
            return Err(AppError::InvalidArgument(
                "A rejection reason is required".to_string(),
            ));
        }
        if reason.is_some_and(|r| r.chars().count() as u64 > MAX_REJECTION_REASON_LENGTH) {
            return Err(AppError::InvalidArgument(format!(
                "Rejection reason exceeds {} characters",
                MAX_REJECTION_REASON_LENGTH
            )));
        }

        let assignment = self
            .reports
            .find_assignment(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        if !actor.has_oversight_access() {
            if !FIELD_STATUSES.contains(&status) {
                return Err(AppError::Forbidden(format!(
                    "Role {} cannot set status {}",
                    actor.role, status
                )));
            }
            if !assignment.is_held_by(actor.id) {
                return Err(AppError::Forbidden(format!(
                    "Report {} is not assigned to you",
                    report_id
                )));
            }
        }

        let report = self
            .reports
            .set_status(report_id, status, reason)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        let announcement = status_announcement(&report);

        if let Err(e) = self.conversations.announce(report.id, &announcement).await {
            tracing::warn!(
                "Status of report {} changed but announcement failed: {}",
                report.id,
                e
            );
        }

        if let Err(e) = self
            .notifications
            .create(
                report.citizen_id(),
                report.id,
                &announcement,
                self.push.as_deref(),
            )
            .await
        {
            tracing::warn!(
                "Status of report {} changed but citizen notification failed: {}",
                report.id,
                e
            );
        }

        Ok(report)
    }
}
