//! In-memory implementation of every repository trait, used by service and route tests.
//!
//! Mirrors the Postgres semantics the services rely on: creation is all-or-nothing,
//! timestamps are strictly increasing, and missing rows surface as `None`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::core::error::{AppError, Result};
use crate::features::assignments::repositories::OfficeRoster;
use crate::features::auth::Role;
use crate::features::chat::models::{
    ChatThread, Message, MessageSnapshot, NewMessage, ReadWatermark, ThreadScope, WatermarkKey,
};
use crate::features::chat::repositories::ChatRepository;
use crate::features::notifications::models::{NewNotification, Notification};
use crate::features::notifications::repositories::NotificationRepository;
use crate::features::reports::models::{
    NewReport, PersonSummary, Report, ReportAssignment, ReportFilter, ReportPhoto, ReportStatus,
};
use crate::features::reports::repositories::ReportRepository;

#[derive(Debug, Clone)]
struct UserRecord {
    username: String,
    first_name: String,
    last_name: String,
    role: Role,
    office_id: Option<i64>,
}

#[derive(Debug, Clone)]
struct ReportRecord {
    title: String,
    description: String,
    latitude: f64,
    longitude: f64,
    category_id: i64,
    office_id: i64,
    status: ReportStatus,
    rejection_reason: Option<String>,
    anonymous: bool,
    citizen_id: i64,
    technical_staff_id: Option<i64>,
    external_maintainer_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct State {
    offices: HashMap<i64, String>,
    categories: HashMap<i64, (String, i64)>,
    status_catalog: Vec<ReportStatus>,
    users: HashMap<i64, UserRecord>,
    reports: BTreeMap<i64, ReportRecord>,
    photos: Vec<ReportPhoto>,
    messages: Vec<Message>,
    watermarks: HashMap<WatermarkKey, DateTime<Utc>>,
    notifications: Vec<Notification>,
    next_report_id: i64,
    next_row_id: i64,
    last_instant: Option<DateTime<Utc>>,
    fail_photo_inserts: bool,
}

impl State {
    /// Wall clock, nudged forward so no two writes share a timestamp
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_instant {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_instant = Some(next);
        next
    }

    fn next_row_id(&mut self) -> i64 {
        self.next_row_id += 1;
        self.next_row_id
    }

    fn person(&self, id: i64) -> PersonSummary {
        let user = self.users.get(&id);
        PersonSummary {
            id,
            username: user.map(|u| u.username.clone()).unwrap_or_default(),
            first_name: user.map(|u| u.first_name.clone()).unwrap_or_default(),
            last_name: user.map(|u| u.last_name.clone()).unwrap_or_default(),
        }
    }

    fn assignment(&self, id: i64, r: &ReportRecord) -> ReportAssignment {
        ReportAssignment {
            report_id: id,
            office_id: r.office_id,
            status: r.status,
            technical_staff_id: r.technical_staff_id,
            external_maintainer_id: r.external_maintainer_id,
            updated_at: r.updated_at,
        }
    }

    fn hydrate(&self, id: i64) -> Option<Report> {
        let r = self.reports.get(&id)?;
        let category_name = self
            .categories
            .get(&r.category_id)
            .map(|(name, _)| name.clone())
            .unwrap_or_default();
        let office_name = self.offices.get(&r.office_id).cloned().unwrap_or_default();

        let mut photos: Vec<ReportPhoto> = self
            .photos
            .iter()
            .filter(|p| p.report_id == id)
            .cloned()
            .collect();
        photos.sort_by_key(|p| p.position);

        Some(Report {
            id,
            title: r.title.clone(),
            description: r.description.clone(),
            latitude: r.latitude,
            longitude: r.longitude,
            category_id: r.category_id,
            category_name,
            office_id: r.office_id,
            office_name,
            status: r.status,
            rejection_reason: r.rejection_reason.clone(),
            anonymous: r.anonymous,
            citizen: self.person(r.citizen_id),
            assignment: self.assignment(id, r),
            technical_staff: r.technical_staff_id.map(|s| self.person(s)),
            external_maintainer: r.external_maintainer_id.map(|m| self.person(m)),
            photos,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }

    fn unread(&self, key: WatermarkKey) -> i64 {
        let watermark = self
            .watermarks
            .get(&key)
            .copied()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        self.messages
            .iter()
            .filter(|m| m.report_id == key.report_id)
            .filter(|m| key.role.is_counterpart(m.sender_type))
            .filter(|m| m.sent_at > watermark)
            .count() as i64
    }

    fn scoped_reports(&self, scope: ThreadScope) -> Vec<(i64, &ReportRecord)> {
        self.reports
            .iter()
            .filter(|(_, r)| r.status.is_listed_in_chat())
            .filter(|(_, r)| {
                scope.includes(r.citizen_id, r.technical_staff_id, r.external_maintainer_id)
            })
            .map(|(id, r)| (*id, r))
            .collect()
    }
}

pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Office 7 (category 1 and 2), office 8 with no staff (category 3), citizens 5 and 6,
    /// reviewer 2, administrator 1, technical staff 42/43 and maintainers 60/61 in office 7.
    /// The first report created gets id 10.
    pub fn seeded() -> Arc<Self> {
        let mut state = State {
            status_catalog: ReportStatus::ALL.to_vec(),
            next_report_id: 10,
            next_row_id: 100,
            ..State::default()
        };

        state.offices.insert(7, "Public Works".to_string());
        state.offices.insert(8, "Parks and Gardens".to_string());
        state.categories.insert(1, ("Public lighting".to_string(), 7));
        state.categories.insert(2, ("Roads and potholes".to_string(), 7));
        state.categories.insert(3, ("Green areas".to_string(), 8));

        let users = [
            (1, "admin", "Ada", "Rossi", Role::Administrator, None),
            (2, "reviewer", "Marco", "Bianchi", Role::MunicipalReviewer, None),
            (5, "lucia", "Lucia", "Verdi", Role::Citizen, None),
            (6, "paolo", "Paolo", "Neri", Role::Citizen, None),
            (42, "staff42", "Giulia", "Conti", Role::TechnicalStaff, Some(7)),
            (43, "staff43", "Luca", "Greco", Role::TechnicalStaff, Some(7)),
            (60, "maint60", "Sara", "Costa", Role::ExternalMaintainer, Some(7)),
            (61, "maint61", "Enzo", "Gallo", Role::ExternalMaintainer, Some(7)),
        ];
        for (id, username, first, last, role, office_id) in users {
            state.users.insert(
                id,
                UserRecord {
                    username: username.to_string(),
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                    role,
                    office_id,
                },
            );
        }

        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    /// Insert a bare PendingApproval report without photos
    pub fn insert_report(&self, citizen_id: i64, category_id: i64) -> i64 {
        let mut state = self.state();
        let office_id = state.categories[&category_id].1;
        let now = state.tick();
        let id = state.next_report_id;
        state.next_report_id += 1;
        state.reports.insert(
            id,
            ReportRecord {
                title: format!("Report {}", id),
                description: "Streetlight has been off for a week".to_string(),
                latitude: 45.07,
                longitude: 7.68,
                category_id,
                office_id,
                status: ReportStatus::PendingApproval,
                rejection_reason: None,
                anonymous: false,
                citizen_id,
                technical_staff_id: None,
                external_maintainer_id: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Write assignment slots directly; setting staff approves a pending report
    pub fn assign(&self, report_id: i64, staff: Option<i64>, maintainer: Option<i64>) {
        let mut state = self.state();
        let now = state.tick();
        let r = state.reports.get_mut(&report_id).unwrap();
        r.technical_staff_id = staff;
        r.external_maintainer_id = maintainer;
        if staff.is_some() && r.status == ReportStatus::PendingApproval {
            r.status = ReportStatus::Assigned;
        }
        r.updated_at = now;
    }

    pub fn force_status(&self, report_id: i64, status: ReportStatus) {
        let mut state = self.state();
        let r = state.reports.get_mut(&report_id).unwrap();
        r.status = status;
        r.rejection_reason = status.retained_rejection_reason(Some("forced"));
    }

    pub fn status_of(&self, report_id: i64) -> ReportStatus {
        self.state().reports[&report_id].status
    }

    pub fn slots_of(&self, report_id: i64) -> (Option<i64>, Option<i64>) {
        let state = self.state();
        let r = &state.reports[&report_id];
        (r.technical_staff_id, r.external_maintainer_id)
    }

    pub fn created_at(&self, report_id: i64) -> DateTime<Utc> {
        self.state().reports[&report_id].created_at
    }

    pub fn report_count(&self) -> usize {
        self.state().reports.len()
    }

    pub fn photo_count(&self) -> usize {
        self.state().photos.len()
    }

    pub fn watermark_count(&self) -> usize {
        self.state().watermarks.len()
    }

    pub fn fail_photo_inserts(&self) {
        self.state().fail_photo_inserts = true;
    }

    /// Remove PendingApproval from the status catalog so creation cannot resolve it
    pub fn drop_status_catalog(&self) {
        self.state()
            .status_catalog
            .retain(|s| *s != ReportStatus::PendingApproval);
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn create(&self, draft: &NewReport) -> Result<Report> {
        let mut guard = self.state();
        // Work on a copy and publish it only once every step succeeded
        let mut scratch = guard.clone();

        let office_id = scratch
            .categories
            .get(&draft.category_id)
            .map(|(_, office)| *office)
            .ok_or_else(|| {
                AppError::InvalidCategory(format!(
                    "Category {} has no office",
                    draft.category_id
                ))
            })?;

        if !scratch
            .status_catalog
            .contains(&ReportStatus::PendingApproval)
        {
            return Err(AppError::Database(sqlx::Error::RowNotFound));
        }

        let now = scratch.tick();
        let id = scratch.next_report_id;
        scratch.next_report_id += 1;
        scratch.reports.insert(
            id,
            ReportRecord {
                title: draft.title.clone(),
                description: draft.description.clone(),
                latitude: draft.latitude,
                longitude: draft.longitude,
                category_id: draft.category_id,
                office_id,
                status: ReportStatus::PendingApproval,
                rejection_reason: None,
                anonymous: draft.anonymous,
                citizen_id: draft.citizen_id,
                technical_staff_id: None,
                external_maintainer_id: None,
                created_at: now,
                updated_at: now,
            },
        );

        for (position, url) in draft.photo_urls.iter().enumerate() {
            if scratch.fail_photo_inserts {
                return Err(AppError::Database(sqlx::Error::Protocol(
                    "photo insert failed".to_string(),
                )));
            }
            let photo_id = scratch.next_row_id();
            scratch.photos.push(ReportPhoto {
                id: photo_id,
                report_id: id,
                position: position as i32,
                url: url.clone(),
            });
        }

        let report = scratch
            .hydrate(id)
            .ok_or_else(|| AppError::Internal("report vanished".to_string()))?;
        *guard = scratch;
        Ok(report)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Report>> {
        Ok(self.state().hydrate(id))
    }

    async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>> {
        let state = self.state();
        let mut reports: Vec<Report> = state
            .reports
            .keys()
            .filter_map(|id| state.hydrate(*id))
            .filter(|r| filter.matches(r))
            .collect();

        match filter {
            ReportFilter::AssignedTo(_) => reports.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            _ => reports.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        Ok(reports)
    }

    async fn set_status(
        &self,
        id: i64,
        status: ReportStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Option<Report>> {
        let mut state = self.state();
        let now = state.tick();
        let Some(r) = state.reports.get_mut(&id) else {
            return Ok(None);
        };
        r.status = status;
        r.rejection_reason = status.retained_rejection_reason(rejection_reason);
        r.updated_at = now;
        Ok(state.hydrate(id))
    }

    async fn find_assignment(&self, id: i64) -> Result<Option<ReportAssignment>> {
        let state = self.state();
        Ok(state.reports.get(&id).map(|r| state.assignment(id, r)))
    }

    async fn assign_technical_staff(
        &self,
        id: i64,
        staff_id: i64,
    ) -> Result<Option<ReportAssignment>> {
        let mut state = self.state();
        let now = state.tick();
        let Some(r) = state.reports.get_mut(&id) else {
            return Ok(None);
        };
        if r.status.is_terminal() {
            return Ok(None);
        }
        if r.technical_staff_id != Some(staff_id) {
            r.external_maintainer_id = None;
        }
        r.technical_staff_id = Some(staff_id);
        if r.status == ReportStatus::PendingApproval {
            r.status = ReportStatus::Assigned;
        }
        r.updated_at = now;
        let r = r.clone();
        Ok(Some(state.assignment(id, &r)))
    }

    async fn assign_external_maintainer(
        &self,
        id: i64,
        maintainer_id: i64,
    ) -> Result<Option<ReportAssignment>> {
        let mut state = self.state();
        let now = state.tick();
        let Some(r) = state.reports.get_mut(&id) else {
            return Ok(None);
        };
        if r.technical_staff_id.is_none() || r.status.is_terminal() {
            return Ok(None);
        }
        r.external_maintainer_id = Some(maintainer_id);
        r.updated_at = now;
        let r = r.clone();
        Ok(Some(state.assignment(id, &r)))
    }
}

#[async_trait]
impl OfficeRoster for InMemoryStore {
    async fn pick_candidate(&self, office_id: i64, role: Role) -> Result<Option<i64>> {
        let state = self.state();

        let load = |user_id: i64| {
            state
                .reports
                .values()
                .filter(|r| !r.status.is_terminal())
                .filter(|r| match role {
                    Role::ExternalMaintainer => r.external_maintainer_id == Some(user_id),
                    _ => r.technical_staff_id == Some(user_id),
                })
                .count()
        };

        Ok(state
            .users
            .iter()
            .filter(|(_, u)| u.role == role && u.office_id == Some(office_id))
            .map(|(id, _)| (load(*id), *id))
            .min()
            .map(|(_, id)| id))
    }
}

#[async_trait]
impl ChatRepository for InMemoryStore {
    async fn insert_message(&self, message: &NewMessage) -> Result<Option<Message>> {
        let mut state = self.state();
        if !state.reports.contains_key(&message.report_id) {
            return Ok(None);
        }
        let stored = Message {
            id: state.next_row_id(),
            report_id: message.report_id,
            sender_type: message.sender_type,
            sender_id: message.sender_id,
            content: message.content.clone(),
            sent_at: state.tick(),
        };
        state.messages.push(stored.clone());
        Ok(Some(stored))
    }

    async fn list_messages(&self, report_id: i64) -> Result<Vec<Message>> {
        let state = self.state();
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.report_id == report_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.sent_at, m.id));
        Ok(messages)
    }

    async fn list_threads(&self, scope: ThreadScope) -> Result<Vec<ChatThread>> {
        let state = self.state();

        let mut threads: Vec<ChatThread> = state
            .scoped_reports(scope)
            .into_iter()
            .map(|(id, r)| {
                let messages: Vec<&Message> =
                    state.messages.iter().filter(|m| m.report_id == id).collect();
                let last = messages.iter().max_by_key(|m| (m.sent_at, m.id));
                let key = WatermarkKey::new(scope.participant_role(), scope.participant_id(), id);

                ChatThread {
                    report_id: id,
                    report_title: r.title.clone(),
                    status: r.status,
                    last_message: last.map(|m| MessageSnapshot {
                        content: m.content.clone(),
                        sender_type: m.sender_type,
                        sent_at: m.sent_at,
                    }),
                    message_count: messages.len() as i64,
                    last_activity_at: last.map(|m| m.sent_at).unwrap_or(r.created_at),
                    unread_count: state.unread(key),
                }
            })
            .collect();

        threads.sort_by(|a, b| {
            b.last_activity_at
                .cmp(&a.last_activity_at)
                .then(b.report_id.cmp(&a.report_id))
        });
        Ok(threads)
    }

    async fn upsert_watermark(&self, key: WatermarkKey) -> Result<Option<ReadWatermark>> {
        let mut state = self.state();
        if !state.reports.contains_key(&key.report_id) {
            return Ok(None);
        }
        let now = state.tick();
        let entry = state.watermarks.entry(key).or_insert(now);
        *entry = (*entry).max(now);

        Ok(Some(ReadWatermark {
            participant_role: key.role,
            participant_id: key.participant_id,
            report_id: key.report_id,
            last_read_at: *entry,
        }))
    }

    async fn unread_count(&self, key: WatermarkKey) -> Result<i64> {
        Ok(self.state().unread(key))
    }

    async fn total_unread_count(&self, scope: ThreadScope) -> Result<i64> {
        let state = self.state();
        Ok(state
            .scoped_reports(scope)
            .into_iter()
            .map(|(id, _)| {
                state.unread(WatermarkKey::new(
                    scope.participant_role(),
                    scope.participant_id(),
                    id,
                ))
            })
            .sum())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert(&self, notification: &NewNotification) -> Result<Notification> {
        let mut state = self.state();
        let stored = Notification {
            id: state.next_row_id(),
            citizen_id: notification.citizen_id,
            report_id: notification.report_id,
            message: notification.message.clone(),
            sent_at: state.tick(),
            seen: false,
        };
        state.notifications.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_citizen(&self, citizen_id: i64) -> Result<Vec<Notification>> {
        let mut listed: Vec<Notification> = self
            .state()
            .notifications
            .iter()
            .filter(|n| n.citizen_id == citizen_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then(b.id.cmp(&a.id)));
        Ok(listed)
    }

    async fn mark_seen(&self, id: i64, citizen_id: i64) -> Result<Option<Notification>> {
        let mut state = self.state();
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.citizen_id == citizen_id)
            .map(|n| {
                n.seen = true;
                n.clone()
            }))
    }

    async fn mark_all_seen(&self, citizen_id: i64) -> Result<u64> {
        let mut state = self.state();
        let mut updated = 0;
        for n in state
            .notifications
            .iter_mut()
            .filter(|n| n.citizen_id == citizen_id && !n.seen)
        {
            n.seen = true;
            updated += 1;
        }
        Ok(updated)
    }
}
