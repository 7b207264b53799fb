mod pg_report_repository;

pub use pg_report_repository::PgReportRepository;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::reports::models::{
    NewReport, Report, ReportAssignment, ReportFilter, ReportStatus,
};

/// Storage of report records, their status and their assignment slots
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Resolve the office, look up the initial status and insert the report with its photos,
    /// all in one transaction. Any failure leaves nothing behind.
    async fn create(&self, draft: &NewReport) -> Result<Report>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Report>>;

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>>;

    /// Returns `None` when no report has this id
    async fn set_status(
        &self,
        id: i64,
        status: ReportStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Report>>;

    async fn find_assignment(&self, id: i64) -> Result<Option<ReportAssignment>>;

    /// Write the technical-staff slot; a PendingApproval report becomes Assigned.
    /// A different staff member drops the external maintainer chosen by the previous one.
    /// Returns `None` when the report is missing or terminal.
    async fn assign_technical_staff(
        &self,
        id: i64,
        staff_id: i64,
    ) -> Result<Option<ReportAssignment>>;

    /// Write the external-maintainer slot. Returns `None` when the report is missing,
    /// terminal, or has no technical staff.
    async fn assign_external_maintainer(
        &self,
        id: i64,
        maintainer_id: i64,
    ) -> Result<Option<ReportAssignment>>;
}
