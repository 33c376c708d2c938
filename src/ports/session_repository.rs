//! Session repository port.
//!
//! Generic CRUD over session records keyed by id. Writes are guarded by an
//! optimistic version check: a stale write is rejected, never merged.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::foundation::{DomainError, SessionId, Timestamp, UserId};
use crate::domain::session::{Session, SessionStatus};

/// Repository port for Session persistence.
///
/// Implementations must:
/// - return `list` and `filter` results ordered by scheduled start
/// - reject an `upsert` whose version differs from the stored one with
///   `ConcurrencyConflict` (details `expected` / `actual`)
/// - store `version + 1` on success and return it
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Every stored session.
    async fn list(&self) -> Result<Vec<Session>, DomainError>;

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Insert (version 0) or replace; returns the new stored version.
    async fn upsert(&self, session: &Session) -> Result<u64, DomainError>;

    async fn filter(&self, filter: &SessionFilter) -> Result<Vec<Session>, DomainError>;

    /// Administrative clear. The only way records are removed.
    async fn clear(&self) -> Result<(), DomainError>;
}

/// Field filters for `SessionRepository::filter`. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub student_id: Option<UserId>,
    pub provider_id: Option<String>,
    pub statuses: Option<HashSet<SessionStatus>>,
    pub payment_reference: Option<String>,
    pub starts_after: Option<Timestamp>,
    pub starts_before: Option<Timestamp>,
}

impl SessionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_student(mut self, student_id: UserId) -> Self {
        self.student_id = Some(student_id);
        self
    }

    pub fn for_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = SessionStatus>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn with_payment_reference(mut self, reference: impl Into<String>) -> Self {
        self.payment_reference = Some(reference.into());
        self
    }

    /// Inclusive lower and exclusive upper bound on scheduled start.
    pub fn starting_between(mut self, after: Option<Timestamp>, before: Option<Timestamp>) -> Self {
        self.starts_after = after;
        self.starts_before = before;
        self
    }

    pub fn matches(&self, session: &Session) -> bool {
        if let Some(student) = &self.student_id {
            if session.student_id() != Some(student) {
                return false;
            }
        }
        if let Some(provider) = &self.provider_id {
            if session.provider_id().trim() != provider.trim() {
                return false;
            }
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&session.status()) {
                return false;
            }
        }
        if let Some(reference) = &self.payment_reference {
            if session.payment_reference() != Some(reference.as_str()) {
                return false;
            }
        }
        if let Some(after) = &self.starts_after {
            if session.scheduled_start().is_before(after) {
                return false;
            }
        }
        if let Some(before) = &self.starts_before {
            if !session.scheduled_start().is_before(before) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ProviderId;
    use crate::domain::session::{CheckoutBooking, SessionType};

    #[test]
    fn session_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SessionRepository) {}
    }

    fn session() -> Session {
        let start = Timestamp::parse("2025-06-10T15:00:00Z").unwrap();
        Session::from_checkout(
            CheckoutBooking {
                student_id: UserId::new("student-1").unwrap(),
                provider_id: ProviderId::new("tutor-math-1").unwrap(),
                session_type: SessionType::Tutoring,
                subject: None,
                start,
                end: start.plus_minutes(60),
                price_cents: 7500,
                amount_charged_cents: 7500,
                payment_reference: "cs_1".into(),
            },
            start.minus_hours(48),
        )
        .unwrap()
        .0
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(SessionFilter::new().matches(&session()));
    }

    #[test]
    fn filters_combine_with_and() {
        let s = session();
        let student = UserId::new("student-1").unwrap();

        assert!(SessionFilter::new()
            .for_student(student.clone())
            .for_provider("tutor-math-1")
            .with_statuses([SessionStatus::Scheduled])
            .with_payment_reference("cs_1")
            .matches(&s));
        assert!(!SessionFilter::new()
            .for_student(student)
            .with_statuses([SessionStatus::Cancelled])
            .matches(&s));
        assert!(!SessionFilter::new().with_payment_reference("cs_2").matches(&s));
    }

    #[test]
    fn start_window_is_half_open() {
        let s = session();
        let start = s.scheduled_start();
        assert!(SessionFilter::new()
            .starting_between(Some(start), Some(start.plus_minutes(1)))
            .matches(&s));
        assert!(!SessionFilter::new()
            .starting_between(None, Some(start))
            .matches(&s));
    }
}
