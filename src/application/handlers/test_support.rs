//! Shared wiring for handler tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::adapters::events::InMemoryEventBus;
use crate::adapters::storage::InMemorySessionRepository;
use crate::domain::booking::{BookingSelection, Slot};
use crate::domain::directory::ServiceKind;
use crate::domain::foundation::{
    Actor, CommandMetadata, DomainError, ErrorCode, Role, SessionId, Timestamp, UserId,
};
use crate::domain::session::Session;
use crate::ports::{SessionFilter, SessionRepository};

pub(crate) fn actor(id: &str, role: Role) -> Actor {
    Actor::new(UserId::new(id).unwrap(), role)
}

pub(crate) fn student() -> Actor {
    actor("student-1", Role::Student)
}

pub(crate) fn other_student() -> Actor {
    actor("student-2", Role::Student)
}

/// Owns the fixture sessions (`tutor-math-1`).
pub(crate) fn tutor() -> Actor {
    actor("tutor-math-1", Role::Provider)
}

pub(crate) fn other_tutor() -> Actor {
    actor("tutor-bio-1", Role::Provider)
}

pub(crate) fn admin() -> Actor {
    actor("admin-1", Role::Admin)
}

pub(crate) fn metadata(actor: Actor) -> CommandMetadata {
    CommandMetadata::new(actor).with_correlation_id("test-correlation")
}

pub(crate) fn hours_from_now(hours: i64) -> Timestamp {
    Timestamp::now().plus_hours(hours)
}

pub(crate) fn slot(day: u32, hour: u32) -> Slot {
    Slot::new(
        chrono::NaiveDate::from_ymd_opt(2030, 5, day).unwrap(),
        chrono::NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
    )
}

/// Monthly Japanese tutoring with the seed directory's Japanese tutor,
/// slots deliberately out of order.
pub(crate) fn japanese_selection() -> BookingSelection {
    BookingSelection {
        service: Some(ServiceKind::Tutoring),
        plan: Some("tutoring-monthly".into()),
        subject: Some("Foreign Languages".into()),
        topic: Some("Japanese".into()),
        school: None,
        slots: vec![slot(6, 10), slot(1, 10), slot(3, 10), slot(8, 10)],
        provider_id: Some("tutor-languages-2".into()),
    }
}

pub(crate) struct Harness {
    pub repository: Arc<InMemorySessionRepository>,
    pub events: Arc<InMemoryEventBus>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self {
            repository: Arc::new(InMemorySessionRepository::new()),
            events: Arc::new(InMemoryEventBus::new()),
        }
    }

    /// Stores `session` through the normal write path.
    pub(crate) async fn seed(&self, mut session: Session) -> Session {
        let version = self.repository.upsert(&session).await.unwrap();
        session.set_version(version);
        session
    }

    pub(crate) async fn stored(&self, session: &Session) -> Session {
        self.repository
            .find_by_id(&session.id())
            .await
            .unwrap()
            .unwrap()
    }
}

/// Session store whose chosen writes fail. Writes are counted from 1
/// across every `upsert` made through this wrapper.
pub(crate) struct FailingWrites {
    inner: Arc<InMemorySessionRepository>,
    writes: AtomicUsize,
    failing: Mutex<HashSet<usize>>,
}

impl FailingWrites {
    pub(crate) fn new(inner: Arc<InMemorySessionRepository>) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Fails the `n`th write from now.
    pub(crate) fn fail_write(&self, n: usize) {
        let next = self.writes.load(Ordering::SeqCst) + n;
        self.failing.lock().unwrap().insert(next);
    }

    pub(crate) fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }
}

#[async_trait]
impl SessionRepository for FailingWrites {
    async fn list(&self) -> Result<Vec<Session>, DomainError> {
        self.inner.list().await
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        self.inner.find_by_id(id).await
    }

    async fn upsert(&self, session: &Session) -> Result<u64, DomainError> {
        let write = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.lock().unwrap().contains(&write) {
            return Err(DomainError::new(ErrorCode::StorageError, "disk full"));
        }
        self.inner.upsert(session).await
    }

    async fn filter(&self, filter: &SessionFilter) -> Result<Vec<Session>, DomainError> {
        self.inner.filter(filter).await
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.inner.clear().await
    }
}
