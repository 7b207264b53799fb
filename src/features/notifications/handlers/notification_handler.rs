use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    Json,
};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;

use crate::core::error::{AppError, Result};
use crate::features::auth::guards::RequireCitizen;
use crate::features::notifications::dtos::{MarkAllSeenResponseDto, NotificationResponseDto};
use crate::features::notifications::services::{NotificationHub, NotificationService};
use crate::shared::types::ApiResponse;

/// State for notification handlers
#[derive(Clone)]
pub struct NotificationState {
    pub notification_service: Arc<NotificationService>,
    pub hub: Arc<NotificationHub>,
}

/// List the citizen's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Notifications", body = ApiResponse<Vec<NotificationResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Citizen access required")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    RequireCitizen(user): RequireCitizen,
    State(state): State<NotificationState>,
) -> Result<Json<ApiResponse<Vec<NotificationResponseDto>>>> {
    let notifications = state.notification_service.list_for_citizen(user.id).await?;
    Ok(Json(ApiResponse::list(
        notifications
            .into_iter()
            .map(NotificationResponseDto::from)
            .collect(),
    )))
}

/// Mark one notification seen
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/seen",
    params(
        ("id" = i64, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked seen", body = ApiResponse<NotificationResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Citizen access required"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_notification_seen(
    RequireCitizen(user): RequireCitizen,
    State(state): State<NotificationState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<NotificationResponseDto>>> {
    let notification = state
        .notification_service
        .mark_seen(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;
    Ok(Json(ApiResponse::success(
        Some(notification.into()),
        None,
        None,
    )))
}

/// Mark every notification of the citizen seen
#[utoipa::path(
    patch,
    path = "/api/notifications/seen",
    responses(
        (status = 200, description = "Notifications marked seen", body = ApiResponse<MarkAllSeenResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Citizen access required")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_all_notifications_seen(
    RequireCitizen(user): RequireCitizen,
    State(state): State<NotificationState>,
) -> Result<Json<ApiResponse<MarkAllSeenResponseDto>>> {
    let updated = state.notification_service.mark_all_seen(user.id).await?;
    Ok(Json(ApiResponse::success(
        Some(MarkAllSeenResponseDto { updated }),
        None,
        None,
    )))
}

/// Live notification stream (Server-Sent Events)
///
/// Each `notification` event carries one notification as JSON. Events missed while the
/// client lagged are dropped; the list endpoint remains the source of truth.
#[utoipa::path(
    get,
    path = "/api/notifications/stream",
    responses(
        (status = 200, description = "SSE stream of notifications", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Citizen access required")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn stream_notifications(
    RequireCitizen(user): RequireCitizen,
    State(state): State<NotificationState>,
) -> Result<Response> {
    let citizen_id = user.id;
    tracing::debug!("Citizen {} subscribed to notification stream", citizen_id);

    let stream = BroadcastStream::new(state.hub.subscribe(citizen_id)).filter_map(move |item| {
        match item {
            Ok(notification) => Event::default()
                .event("notification")
                .json_data(NotificationResponseDto::from(notification))
                .ok()
                .map(Ok::<_, Infallible>),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::debug!(
                    "Notification stream for citizen {} skipped {} event(s)",
                    citizen_id,
                    skipped
                );
                None
            }
        }
    });

    let sse = Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    );

    Ok(sse.into_response())
}
