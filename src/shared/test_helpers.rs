#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};
#[cfg(test)]
use sqlx::PgPool;

#[cfg(test)]
use crate::features::assignments::services::AssignmentService;
#[cfg(test)]
use crate::features::auth::model::{AuthenticatedUser, Role};
#[cfg(test)]
use crate::features::chat::services::{ConversationService, ReadTrackerService};
#[cfg(test)]
use crate::features::notifications::services::{
    NotificationHub, NotificationService, PushChannel,
};
#[cfg(test)]
use crate::features::reports::models::NewReport;
#[cfg(test)]
use crate::features::reports::services::ReportService;
#[cfg(test)]
use crate::shared::memory_store::InMemoryStore;

#[cfg(test)]
pub fn citizen(id: i64) -> AuthenticatedUser {
    AuthenticatedUser::new(id, Role::Citizen)
}

#[cfg(test)]
pub fn operator(id: i64, role: Role) -> AuthenticatedUser {
    AuthenticatedUser::new(id, role)
}

/// Stand-in for the JWT middleware: every request runs as `user`
#[cfg(test)]
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| async move {
            request.extensions_mut().insert(user);
            next.run(request).await
        },
    ))
}

/// Every service wired over one seeded in-memory store
#[cfg(test)]
pub struct TestServices {
    pub store: Arc<InMemoryStore>,
    pub hub: Arc<NotificationHub>,
    pub reports: Arc<ReportService>,
    pub assignments: Arc<AssignmentService>,
    pub conversations: Arc<ConversationService>,
    pub read_tracker: Arc<ReadTrackerService>,
    pub notifications: Arc<NotificationService>,
}

#[cfg(test)]
impl TestServices {
    pub fn new() -> Self {
        let store = InMemoryStore::seeded();
        let hub = Arc::new(NotificationHub::new(8));
        let push: Arc<dyn PushChannel> = hub.clone();

        let conversations = Arc::new(ConversationService::new(store.clone()));
        let read_tracker = Arc::new(ReadTrackerService::new(store.clone()));
        let notifications = Arc::new(NotificationService::new(store.clone()));
        let reports = Arc::new(ReportService::new(
            store.clone(),
            conversations.clone(),
            notifications.clone(),
            Some(push),
        ));
        let assignments = Arc::new(AssignmentService::new(store.clone(), store.clone()));

        Self {
            store,
            hub,
            reports,
            assignments,
            conversations,
            read_tracker,
            notifications,
        }
    }
}

/// Directory rows matching `InMemoryStore::seeded`, for tests against a migrated database
#[cfg(test)]
const DIRECTORY_FIXTURE: &str = r#"
    INSERT INTO offices (id, name) VALUES
        (7, 'Public Works'),
        (8, 'Parks and Gardens');

    INSERT INTO categories (id, name, office_id) VALUES
        (1, 'Public lighting', 7),
        (2, 'Roads and potholes', 7),
        (3, 'Green areas', 8);

    INSERT INTO users (id, username, first_name, last_name, role, office_id) VALUES
        (1, 'admin', 'Ada', 'Rossi', 'administrator', NULL),
        (2, 'reviewer', 'Marco', 'Bianchi', 'municipal_reviewer', NULL),
        (5, 'lucia', 'Lucia', 'Verdi', 'citizen', NULL),
        (6, 'paolo', 'Paolo', 'Neri', 'citizen', NULL),
        (42, 'staff42', 'Giulia', 'Conti', 'technical_staff', 7),
        (43, 'staff43', 'Luca', 'Greco', 'technical_staff', 7),
        (60, 'maint60', 'Sara', 'Costa', 'external_maintainer', 7),
        (61, 'maint61', 'Enzo', 'Gallo', 'external_maintainer', 7);
"#;

#[cfg(test)]
pub async fn seed_directory(pool: &PgPool) {
    sqlx::raw_sql(DIRECTORY_FIXTURE)
        .execute(pool)
        .await
        .unwrap();
}

#[cfg(test)]
pub fn new_report(citizen_id: i64, category_id: i64, photo_urls: &[&str]) -> NewReport {
    NewReport {
        citizen_id,
        title: "Broken streetlight".to_string(),
        description: "Dark corner near the school".to_string(),
        latitude: 45.07,
        longitude: 7.68,
        category_id,
        anonymous: false,
        photo_urls: photo_urls.iter().map(|u| u.to_string()).collect(),
    }
}
