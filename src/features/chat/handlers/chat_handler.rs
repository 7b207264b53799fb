use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::chat::dtos::{
    MessageResponseDto, SendMessageDto, ThreadResponseDto, UnreadCountDto,
};
use crate::features::chat::models::{ReadWatermark, SenderType};
use crate::features::chat::services::{ConversationService, ReadTrackerService};
use crate::features::notifications::services::{NotificationService, PushChannel};
use crate::features::reports::services::ReportService;
use crate::shared::types::ApiResponse;

/// State for chat handlers
#[derive(Clone)]
pub struct ChatState {
    pub report_service: Arc<ReportService>,
    pub conversation_service: Arc<ConversationService>,
    pub read_tracker: Arc<ReadTrackerService>,
    pub notification_service: Arc<NotificationService>,
    pub push: Option<Arc<dyn PushChannel>>,
}

/// List the caller's conversations, most recently active first
#[utoipa::path(
    get,
    path = "/api/chats",
    responses(
        (status = 200, description = "Conversation threads", body = ApiResponse<Vec<ThreadResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "chats"
)]
pub async fn list_threads(
    user: AuthenticatedUser,
    State(state): State<ChatState>,
) -> Result<Json<ApiResponse<Vec<ThreadResponseDto>>>> {
    let threads = state.conversation_service.list_threads_for(&user).await?;
    Ok(Json(ApiResponse::list(
        threads.into_iter().map(ThreadResponseDto::from).collect(),
    )))
}

/// Unread messages across all of the caller's conversations
#[utoipa::path(
    get,
    path = "/api/chats/unread-count",
    responses(
        (status = 200, description = "Total unread count", body = ApiResponse<UnreadCountDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "chats"
)]
pub async fn total_unread_count(
    user: AuthenticatedUser,
    State(state): State<ChatState>,
) -> Result<Json<ApiResponse<UnreadCountDto>>> {
    let unread_count = state.read_tracker.total_unread_count(&user).await?;
    Ok(Json(ApiResponse::success(
        Some(UnreadCountDto { unread_count }),
        None,
        None,
    )))
}

/// Read a conversation; opening it advances the caller's read watermark
#[utoipa::path(
    get,
    path = "/api/chats/{report_id}/messages",
    params(
        ("report_id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Messages, oldest first", body = ApiResponse<Vec<MessageResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "chats"
)]
pub async fn list_messages(
    user: AuthenticatedUser,
    State(state): State<ChatState>,
    Path(report_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<MessageResponseDto>>>> {
    state.report_service.get_for(&user, report_id).await?;

    let messages = state.conversation_service.list(report_id).await?;
    state
        .read_tracker
        .mark_read(user.role.participant_role(), user.id, report_id)
        .await?;

    Ok(Json(ApiResponse::list(
        messages.into_iter().map(MessageResponseDto::from).collect(),
    )))
}

/// Post a message; the citizen is notified when an operator writes
#[utoipa::path(
    post,
    path = "/api/chats/{report_id}/messages",
    params(
        ("report_id" = i64, Path, description = "Report ID")
    ),
    request_body = SendMessageDto,
    responses(
        (status = 200, description = "Message stored", body = ApiResponse<MessageResponseDto>),
        (status = 400, description = "Invalid message"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "chats"
)]
pub async fn send_message(
    user: AuthenticatedUser,
    State(state): State<ChatState>,
    Path(report_id): Path<i64>,
    AppJson(dto): AppJson<SendMessageDto>,
) -> Result<Json<ApiResponse<MessageResponseDto>>> {
    let report = state.report_service.get_for(&user, report_id).await?;

    let message = state
        .conversation_service
        .append(report_id, user.role.sender_type(), Some(user.id), &dto.content)
        .await?;

    if message.sender_type == SenderType::Operator {
        let text = format!("New message on your report \"{}\"", report.title);
        if let Err(e) = state
            .notification_service
            .create(report.citizen_id(), report_id, &text, state.push.as_deref())
            .await
        {
            tracing::warn!(
                "Failed to notify citizen {} about message {}: {:?}",
                report.citizen_id(),
                message.id,
                e
            );
        }
    }

    Ok(Json(ApiResponse::success(
        Some(message.into()),
        Some("Message sent".to_string()),
        None,
    )))
}

/// Mark a conversation read up to now
#[utoipa::path(
    post,
    path = "/api/chats/{report_id}/read",
    params(
        ("report_id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Watermark advanced", body = ApiResponse<ReadWatermark>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "chats"
)]
pub async fn mark_read(
    user: AuthenticatedUser,
    State(state): State<ChatState>,
    Path(report_id): Path<i64>,
) -> Result<Json<ApiResponse<ReadWatermark>>> {
    state.report_service.get_for(&user, report_id).await?;

    let watermark = state
        .read_tracker
        .mark_read(user.role.participant_role(), user.id, report_id)
        .await?;
    Ok(Json(ApiResponse::success(Some(watermark), None, None)))
}

/// Unread messages in one conversation
#[utoipa::path(
    get,
    path = "/api/chats/{report_id}/unread-count",
    params(
        ("report_id" = i64, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Unread count", body = ApiResponse<UnreadCountDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "chats"
)]
pub async fn unread_count(
    user: AuthenticatedUser,
    State(state): State<ChatState>,
    Path(report_id): Path<i64>,
) -> Result<Json<ApiResponse<UnreadCountDto>>> {
    state.report_service.get_for(&user, report_id).await?;

    let unread_count = state
        .read_tracker
        .unread_count(user.role.participant_role(), user.id, report_id)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(UnreadCountDto { unread_count }),
        None,
        None,
    )))
}
