use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::AuthenticatedUser;
use crate::features::chat::models::{ParticipantRole, ReadWatermark, ThreadScope, WatermarkKey};
use crate::features::chat::repositories::ChatRepository;

/// Derives unread counts from per-participant read watermarks
pub struct ReadTrackerService {
    repo: Arc<dyn ChatRepository>,
}

fn key(role: ParticipantRole, participant_id: i64, report_id: i64) -> Result<WatermarkKey> {
    if participant_id <= 0 {
        return Err(AppError::InvalidArgument(
            "Participant id must be a positive integer".to_string(),
        ));
    }
    Ok(WatermarkKey::new(role, participant_id, report_id))
}

impl ReadTrackerService {
    pub fn new(repo: Arc<dyn ChatRepository>) -> Self {
        Self { repo }
    }

    pub async fn mark_read(
        &self,
        role: ParticipantRole,
        participant_id: i64,
        report_id: i64,
    ) -> Result<ReadWatermark> {
        self.repo
            .upsert_watermark(key(role, participant_id, report_id)?)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))
    }

    /// Messages from the other side newer than the watermark; everything counts before
    /// the first read.
    pub async fn unread_count(
        &self,
        role: ParticipantRole,
        participant_id: i64,
        report_id: i64,
    ) -> Result<i64> {
        self.repo
            .unread_count(key(role, participant_id, report_id)?)
            .await
    }

    /// Recomputed on every call over the participant's listed threads
    pub async fn total_unread_count(&self, participant: &AuthenticatedUser) -> Result<i64> {
        self.repo
            .total_unread_count(ThreadScope::for_participant(participant))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::Role;
    use crate::features::chat::models::SenderType;
    use crate::features::chat::services::ConversationService;
    use crate::shared::memory_store::InMemoryStore;

    struct Fixture {
        store: Arc<InMemoryStore>,
        chat: ConversationService,
        tracker: ReadTrackerService,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::seeded();
        Fixture {
            chat: ConversationService::new(store.clone()),
            tracker: ReadTrackerService::new(store.clone()),
            store,
        }
    }

    #[tokio::test]
    async fn test_unread_follows_watermark() {
        let f = fixture();
        let report = f.store.insert_report(5, 1);
        f.store.assign(report, Some(42), None);

        f.chat
            .append(report, SenderType::Operator, Some(42), "We will look at it")
            .await
            .unwrap();
        assert_eq!(
            f.tracker
                .unread_count(ParticipantRole::Citizen, 5, report)
                .await
                .unwrap(),
            1
        );

        f.tracker
            .mark_read(ParticipantRole::Citizen, 5, report)
            .await
            .unwrap();
        assert_eq!(
            f.tracker
                .unread_count(ParticipantRole::Citizen, 5, report)
                .await
                .unwrap(),
            0
        );

        f.chat
            .append(report, SenderType::Operator, Some(42), "Fixed tomorrow")
            .await
            .unwrap();
        assert_eq!(
            f.tracker
                .unread_count(ParticipantRole::Citizen, 5, report)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_mark_read_then_n_messages() {
        let f = fixture();
        let report = f.store.insert_report(5, 1);

        for i in 0..7 {
            f.chat
                .append(report, SenderType::Citizen, Some(5), &format!("note {}", i))
                .await
                .unwrap();
        }
        f.tracker
            .mark_read(ParticipantRole::Operator, 42, report)
            .await
            .unwrap();
        assert_eq!(
            f.tracker
                .unread_count(ParticipantRole::Operator, 42, report)
                .await
                .unwrap(),
            0
        );

        for i in 0..3 {
            f.chat
                .append(report, SenderType::Citizen, Some(5), &format!("more {}", i))
                .await
                .unwrap();
        }
        // Own-side messages never count
        f.chat
            .append(report, SenderType::Operator, Some(42), "ack")
            .await
            .unwrap();

        assert_eq!(
            f.tracker
                .unread_count(ParticipantRole::Operator, 42, report)
                .await
                .unwrap(),
            3
        );
    }

    #[tokio::test]
    async fn test_system_messages_count_for_both_sides() {
        let f = fixture();
        let report = f.store.insert_report(5, 1);
        f.chat.announce(report, "Report approved").await.unwrap();

        for role in [ParticipantRole::Citizen, ParticipantRole::Operator] {
            assert_eq!(f.tracker.unread_count(role, 5, report).await.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_watermark_never_moves_backwards() {
        let f = fixture();
        let report = f.store.insert_report(5, 1);

        let first = f
            .tracker
            .mark_read(ParticipantRole::Citizen, 5, report)
            .await
            .unwrap();
        let second = f
            .tracker
            .mark_read(ParticipantRole::Citizen, 5, report)
            .await
            .unwrap();

        assert!(second.last_read_at >= first.last_read_at);
        assert_eq!(f.store.watermark_count(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_validation() {
        let f = fixture();
        assert!(matches!(
            f.tracker.mark_read(ParticipantRole::Citizen, 0, 10).await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.tracker.mark_read(ParticipantRole::Citizen, 5, 999).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_total_unread_sums_listed_threads_only() {
        let f = fixture();
        let a = f.store.insert_report(5, 1);
        let b = f.store.insert_report(5, 1);
        let pending = f.store.insert_report(5, 1);
        f.store.assign(a, Some(42), None);
        f.store.assign(b, Some(42), None);

        for report in [a, a, b, pending] {
            f.chat
                .append(report, SenderType::Operator, Some(42), "update")
                .await
                .unwrap();
        }

        let citizen = AuthenticatedUser::new(5, Role::Citizen);
        assert_eq!(f.tracker.total_unread_count(&citizen).await.unwrap(), 3);

        f.tracker
            .mark_read(ParticipantRole::Citizen, 5, a)
            .await
            .unwrap();
        assert_eq!(f.tracker.total_unread_count(&citizen).await.unwrap(), 1);

        let staff = AuthenticatedUser::new(42, Role::TechnicalStaff);
        assert_eq!(f.tracker.total_unread_count(&staff).await.unwrap(), 0);
    }
}
