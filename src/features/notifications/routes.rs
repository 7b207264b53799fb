use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::notifications::handlers::{self, NotificationState};
use crate::features::notifications::services::{NotificationHub, NotificationService};

pub fn routes(notification_service: Arc<NotificationService>, hub: Arc<NotificationHub>) -> Router {
    let state = NotificationState {
        notification_service,
        hub,
    };

    Router::new()
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/seen",
            patch(handlers::mark_all_notifications_seen),
        )
        .route(
            "/api/notifications/stream",
            get(handlers::stream_notifications),
        )
        .route(
            "/api/notifications/{id}/seen",
            patch(handlers::mark_notification_seen),
        )
        .with_state(state)
}
