use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::assignments::dtos::AssignOperatorDto;
use crate::features::assignments::services::AssignmentService;
use crate::features::auth::guards::RequireOperator;
use crate::features::reports::dtos::AssignmentResponseDto;
use crate::shared::types::ApiResponse;

/// State for assignment handlers
#[derive(Clone)]
pub struct AssignmentState {
    pub assignment_service: Arc<AssignmentService>,
}

fn assigned(dto: AssignmentResponseDto, message: &str) -> Json<ApiResponse<AssignmentResponseDto>> {
    Json(ApiResponse::success(Some(dto), Some(message.to_string()), None))
}

/// Assign a named technical staff member to a report
#[utoipa::path(
    post,
    path = "/api/reports/{id}/assignments/technical-staff",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = AssignOperatorDto,
    responses(
        (status = 200, description = "Technical staff assigned", body = ApiResponse<AssignmentResponseDto>),
        (status = 400, description = "Report cannot be routed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not perform this hand-off"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn assign_technical_staff(
    RequireOperator(user): RequireOperator,
    State(state): State<AssignmentState>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<AssignOperatorDto>,
) -> Result<Json<ApiResponse<AssignmentResponseDto>>> {
    let assignment = state
        .assignment_service
        .assign_technical_staff(&user, id, dto.operator_id)
        .await?;
    Ok(assigned(assignment.into(), "Technical staff assigned"))
}

/// Assign the least-loaded technical staff member of the report's office
#[utoipa::path(
    post,
    path = "/api/reports/{id}/assignments/technical-staff/auto",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Technical staff assigned", body = ApiResponse<AssignmentResponseDto>),
        (status = 400, description = "Report cannot be routed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not perform this hand-off"),
        (status = 404, description = "Report not found or office has no technical staff")
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn auto_assign_technical_staff(
    RequireOperator(user): RequireOperator,
    State(state): State<AssignmentState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AssignmentResponseDto>>> {
    let assignment = state
        .assignment_service
        .auto_assign_technical_staff(&user, id)
        .await?;
    Ok(assigned(assignment.into(), "Technical staff assigned"))
}

/// Delegate a report to a named external maintainer
#[utoipa::path(
    post,
    path = "/api/reports/{id}/assignments/external-maintainer",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    request_body = AssignOperatorDto,
    responses(
        (status = 200, description = "External maintainer assigned", body = ApiResponse<AssignmentResponseDto>),
        (status = 400, description = "Report cannot be routed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not perform this hand-off"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn assign_external_maintainer(
    RequireOperator(user): RequireOperator,
    State(state): State<AssignmentState>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<AssignOperatorDto>,
) -> Result<Json<ApiResponse<AssignmentResponseDto>>> {
    let assignment = state
        .assignment_service
        .assign_external_maintainer(&user, id, dto.operator_id)
        .await?;
    Ok(assigned(assignment.into(), "External maintainer assigned"))
}

/// Delegate a report to the least-loaded external maintainer of its office
#[utoipa::path(
    post,
    path = "/api/reports/{id}/assignments/external-maintainer/auto",
    params(
        ("id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "External maintainer assigned", body = ApiResponse<AssignmentResponseDto>),
        (status = 400, description = "Report cannot be routed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role may not perform this hand-off"),
        (status = 404, description = "Report not found or office has no maintainers")
    ),
    security(("bearer_auth" = [])),
    tag = "assignments"
)]
pub async fn auto_assign_external_maintainer(
    RequireOperator(user): RequireOperator,
    State(state): State<AssignmentState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AssignmentResponseDto>>> {
    let assignment = state
        .assignment_service
        .auto_assign_external_maintainer(&user, id)
        .await?;
    Ok(assigned(assignment.into(), "External maintainer assigned"))
}
