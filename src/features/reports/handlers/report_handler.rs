use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireCitizen, RequireOperator};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{CreateReportDto, ReportResponseDto, UpdateReportStatusDto};
use crate::features::reports::models::{ApprovedReport, Report};
use crate::features::reports::services::ReportService;
use crate::shared::types::ApiResponse;

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
}

fn to_dtos(reports: Vec<Report>) -> Vec<ReportResponseDto> {
    reports.into_iter().map(ReportResponseDto::from).collect()
}

/// Submit a new report (citizen only)
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportDto,
    responses(
        (status = 200, description = "Report created", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid report"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Citizen access required"),
        (status = 422, description = "Category has no office")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    RequireCitizen(user): RequireCitizen,
    State(state): State<ReportState>,
    AppJson(dto): AppJson<CreateReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state
        .report_service
        .create(&dto.into_new_report(user.id))
        .await?;
    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report submitted".to_string()),
        None,
    )))
}

/// List every report (reviewers and administrators)
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "All reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    if !user.has_oversight_access() {
        return Err(AppError::Forbidden(
            "Reviewer or administrator access required".to_string(),
        ));
    }
    let reports = state.report_service.list_all().await?;
    Ok(Json(ApiResponse::list(to_dtos(reports))))
}

/// List the authenticated citizen's own reports
#[utoipa::path(
    get,
    path = "/api/reports/mine",
    responses(
        (status = 200, description = "Citizen's reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Citizen access required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_my_reports(
    RequireCitizen(user): RequireCitizen,
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = state.report_service.list_by_citizen(user.id).await?;
    Ok(Json(ApiResponse::list(to_dtos(reports))))
}

/// List approved reports for the public map
#[utoipa::path(
    get,
    path = "/api/reports/approved",
    responses(
        (status = 200, description = "Approved reports", body = ApiResponse<Vec<ApprovedReport>>)
    ),
    tag = "reports"
)]
pub async fn list_approved_reports(
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<ApprovedReport>>>> {
    let reports = state.report_service.list_approved().await?;
    Ok(Json(ApiResponse::list(reports)))
}

/// List reports assigned to the authenticated operator
#[utoipa::path(
    get,
    path = "/api/reports/assigned",
    responses(
        (status = 200, description = "Assigned reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Operator access required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_assigned_reports(
    RequireOperator(user): RequireOperator,
    State(state): State<ReportState>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = state.report_service.list_assigned_to(user.id).await?;
    Ok(Json(ApiResponse::list(to_dtos(reports))))
}

/// Get a report the caller takes part in
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_for(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Change a report's status (operators)
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid status change"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state
        .report_service
        .change_status(&user, id, dto.status, dto.rejection_reason.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}
