//! In-memory session repository for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::session::Session;
use crate::ports::{SessionFilter, SessionRepository};

use super::{next_version, sort_by_start};

#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, bypassing the version check.
    pub async fn with_sessions(self, sessions: impl IntoIterator<Item = Session>) -> Self {
        {
            let mut guard = self.sessions.write().await;
            for session in sessions {
                guard.insert(session.id(), session);
            }
        }
        self
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn list(&self) -> Result<Vec<Session>, DomainError> {
        let mut sessions: Vec<Session> = self.sessions.read().await.values().cloned().collect();
        sort_by_start(&mut sessions);
        Ok(sessions)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn upsert(&self, session: &Session) -> Result<u64, DomainError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get(&session.id()).map(Session::version);
        let version = next_version(stored, session.version())?;

        let mut saved = session.clone();
        saved.set_version(version);
        sessions.insert(saved.id(), saved);
        Ok(version)
    }

    async fn filter(&self, filter: &SessionFilter) -> Result<Vec<Session>, DomainError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        sort_by_start(&mut sessions);
        Ok(sessions)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.sessions.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, ProviderId, Timestamp};
    use crate::domain::session::{NewSlot, SessionStatus, SessionType};

    fn slot_at(hour: u32) -> Session {
        let start = Timestamp::parse(&format!("2025-06-10T{:02}:00:00Z", hour)).unwrap();
        Session::new_available(
            NewSlot {
                provider_id: ProviderId::new("tutor-math-1").unwrap(),
                service_type_id: None,
                availability_id: None,
                session_type: SessionType::Tutoring,
                subject: None,
                grade_level: None,
                start,
                end: start.plus_minutes(60),
                price_cents: 7500,
            },
            start.minus_hours(48),
        )
        .unwrap()
        .0
    }

    #[tokio::test]
    async fn upsert_then_find_bumps_version() {
        let repo = InMemorySessionRepository::new();
        let session = slot_at(10);

        assert_eq!(repo.upsert(&session).await.unwrap(), 1);
        let stored = repo.find_by_id(&session.id()).await.unwrap().unwrap();
        assert_eq!(stored.version(), 1);
        assert_eq!(repo.upsert(&stored).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn stale_write_is_rejected() {
        let repo = InMemorySessionRepository::new();
        let session = slot_at(10);
        repo.upsert(&session).await.unwrap();

        let first = repo.find_by_id(&session.id()).await.unwrap().unwrap();
        let second = first.clone();
        repo.upsert(&first).await.unwrap();

        let err = repo.upsert(&second).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrencyConflict);
    }

    #[tokio::test]
    async fn list_is_ordered_by_start() {
        let repo = InMemorySessionRepository::new();
        for hour in [15, 9, 12] {
            repo.upsert(&slot_at(hour)).await.unwrap();
        }

        let starts: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .iter()
            .map(|s| s.scheduled_start().to_string())
            .collect();
        assert_eq!(
            starts,
            vec![
                "2025-06-10T09:00:00Z",
                "2025-06-10T12:00:00Z",
                "2025-06-10T15:00:00Z"
            ]
        );
    }

    #[tokio::test]
    async fn filter_and_clear() {
        let repo = InMemorySessionRepository::new();
        repo.upsert(&slot_at(9)).await.unwrap();

        let open = repo
            .filter(&SessionFilter::new().with_statuses([SessionStatus::Available]))
            .await
            .unwrap();
        assert_eq!(open.len(), 1);

        repo.clear().await.unwrap();
        assert_eq!(repo.len().await, 0);
    }
}
