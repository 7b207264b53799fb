mod approved_report;
mod report;
mod report_assignment;
mod report_photo;

pub use approved_report::ApprovedReport;
pub use report::{NewReport, PersonSummary, Report, ReportFilter, ReportRow, ReportStatus};
pub use report_assignment::{AssignmentStage, ReportAssignment};
pub use report_photo::ReportPhoto;
