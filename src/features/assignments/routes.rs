use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::assignments::handlers::{self, AssignmentState};
use crate::features::assignments::services::AssignmentService;

pub fn routes(assignment_service: Arc<AssignmentService>) -> Router {
    let state = AssignmentState { assignment_service };

    Router::new()
        .route(
            "/api/reports/{id}/assignments/technical-staff",
            post(handlers::assign_technical_staff),
        )
        .route(
            "/api/reports/{id}/assignments/technical-staff/auto",
            post(handlers::auto_assign_technical_staff),
        )
        .route(
            "/api/reports/{id}/assignments/external-maintainer",
            post(handlers::assign_external_maintainer),
        )
        .route(
            "/api/reports/{id}/assignments/external-maintainer/auto",
            post(handlers::auto_assign_external_maintainer),
        )
        .with_state(state)
}
