use axum::{
    routing::{get, post},
    Router,
};

use crate::features::chat::handlers::{self, ChatState};

pub fn routes(state: ChatState) -> Router {
    Router::new()
        .route("/api/chats", get(handlers::list_threads))
        .route("/api/chats/unread-count", get(handlers::total_unread_count))
        .route(
            "/api/chats/{report_id}/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route("/api/chats/{report_id}/read", post(handlers::mark_read))
        .route(
            "/api/chats/{report_id}/unread-count",
            get(handlers::unread_count),
        )
        .with_state(state)
}
