use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::assignments::{dtos as assignments_dtos, handlers as assignments_handlers};
use crate::features::auth;
use crate::features::chat::{
    dtos as chat_dtos, handlers as chat_handlers, models as chat_models,
};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_reports,
        reports_handlers::list_my_reports,
        reports_handlers::list_approved_reports,
        reports_handlers::list_assigned_reports,
        reports_handlers::get_report,
        reports_handlers::update_report_status,
        // Assignments
        assignments_handlers::assign_technical_staff,
        assignments_handlers::auto_assign_technical_staff,
        assignments_handlers::assign_external_maintainer,
        assignments_handlers::auto_assign_external_maintainer,
        // Chats
        chat_handlers::list_threads,
        chat_handlers::total_unread_count,
        chat_handlers::list_messages,
        chat_handlers::send_message,
        chat_handlers::mark_read,
        chat_handlers::unread_count,
        // Notifications
        notifications_handlers::list_notifications,
        notifications_handlers::mark_notification_seen,
        notifications_handlers::mark_all_notifications_seen,
        notifications_handlers::stream_notifications,
    ),
    components(
        schemas(
            // Shared
            Meta,
            auth::model::AuthenticatedUser,
            auth::model::Role,
            // Reports
            reports_models::ReportStatus,
            reports_models::PersonSummary,
            reports_models::ApprovedReport,
            reports_models::AssignmentStage,
            reports_dtos::CreateReportDto,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::NamedRefDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::AssignmentResponseDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<Vec<reports_models::ApprovedReport>>,
            ApiResponse<reports_dtos::AssignmentResponseDto>,
            // Assignments
            assignments_dtos::AssignOperatorDto,
            // Chats
            chat_models::SenderType,
            chat_models::ParticipantRole,
            chat_models::ReadWatermark,
            chat_dtos::SendMessageDto,
            chat_dtos::MessageResponseDto,
            chat_dtos::LastMessageDto,
            chat_dtos::ThreadResponseDto,
            chat_dtos::UnreadCountDto,
            ApiResponse<Vec<chat_dtos::ThreadResponseDto>>,
            ApiResponse<Vec<chat_dtos::MessageResponseDto>>,
            ApiResponse<chat_dtos::MessageResponseDto>,
            ApiResponse<chat_dtos::UnreadCountDto>,
            ApiResponse<chat_models::ReadWatermark>,
            // Notifications
            notifications_dtos::NotificationResponseDto,
            notifications_dtos::MarkAllSeenResponseDto,
            ApiResponse<Vec<notifications_dtos::NotificationResponseDto>>,
            ApiResponse<notifications_dtos::NotificationResponseDto>,
            ApiResponse<notifications_dtos::MarkAllSeenResponseDto>,
        )
    ),
    tags(
        (name = "reports", description = "Citizen reports and their status workflow"),
        (name = "assignments", description = "Hand-off of reports to technical staff and external maintainers"),
        (name = "chats", description = "Per-report conversations and unread tracking"),
        (name = "notifications", description = "Citizen notifications and live stream"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Civic Report API",
        version = "0.1.0",
        description = "API documentation for the civic report service",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
