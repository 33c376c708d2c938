//! Best-effort meeting creation for confirmed sessions.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::domain::session::{Session, SessionEvent};
use crate::ports::{MeetingError, MeetingProvider, MeetingRequest};

/// What happened when a meeting was requested.
#[derive(Debug)]
pub enum MeetingOutcome {
    Attached(SessionEvent),
    /// No link; the session stays confirmed. Carries the warning for the caller.
    Skipped(String),
}

/// Retries transient failures a bounded number of times, then gives up.
pub struct MeetingScheduler {
    provider: Arc<dyn MeetingProvider>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl MeetingScheduler {
    pub fn new(provider: Arc<dyn MeetingProvider>, max_attempts: u32) -> Self {
        Self {
            provider,
            max_attempts: max_attempts.max(1),
            retry_delay: Duration::from_millis(200),
        }
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub async fn attach(
        &self,
        session: &mut Session,
        topic: String,
        host_email: Option<String>,
    ) -> MeetingOutcome {
        let duration_minutes = u32::try_from(session.duration_minutes()).unwrap_or(u32::MAX);
        let request = MeetingRequest {
            topic,
            start: session.scheduled_start(),
            duration_minutes,
            host_email,
        };

        let mut last_error: Option<MeetingError> = None;
        for attempt in 1..=self.max_attempts {
            match self.provider.create_meeting(request.clone()).await {
                Ok(link) => {
                    return match session.attach_meeting(link, Timestamp::now()) {
                        Ok(event) => MeetingOutcome::Attached(event),
                        Err(e) => MeetingOutcome::Skipped(e.message()),
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session.id(),
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Meeting creation failed"
                    );
                    let transient = e.is_transient();
                    last_error = Some(e);
                    if !transient {
                        break;
                    }
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
        MeetingOutcome::Skipped(format!(
            "Session confirmed, but no meeting link could be created: {}",
            reason
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::meeting::MockMeetingProvider;
    use crate::domain::session::SessionStatus;

    fn confirmed_session() -> Session {
        let mut session = crate::domain::session::fixtures::scheduled_session();
        assert_eq!(session.status(), SessionStatus::Scheduled);
        session.set_version(1);
        session
    }

    fn scheduler(mock: Arc<MockMeetingProvider>) -> MeetingScheduler {
        MeetingScheduler::new(mock, 3).with_retry_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let mock = Arc::new(MockMeetingProvider::new());
        mock.push_failure(MeetingError::Unavailable("503".into()));
        mock.push_failure(MeetingError::Unavailable("503".into()));
        let mut session = confirmed_session();

        let outcome = scheduler(mock.clone())
            .attach(&mut session, "Algebra".into(), None)
            .await;

        assert!(matches!(outcome, MeetingOutcome::Attached(_)));
        assert_eq!(mock.call_count(), 3);
        assert!(session.meeting().is_some());
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mock = Arc::new(MockMeetingProvider::failing(MeetingError::Unavailable(
            "down".into(),
        )));
        let mut session = confirmed_session();

        let outcome = scheduler(mock.clone())
            .attach(&mut session, "Algebra".into(), None)
            .await;

        assert!(matches!(outcome, MeetingOutcome::Skipped(_)));
        assert_eq!(mock.call_count(), 3);
        assert_eq!(session.status(), SessionStatus::Scheduled);
        assert!(session.meeting().is_none());
    }

    #[tokio::test]
    async fn rejected_requests_are_not_retried() {
        let mock = Arc::new(MockMeetingProvider::failing(MeetingError::Rejected(
            "bad host".into(),
        )));
        let mut session = confirmed_session();

        let outcome = scheduler(mock.clone())
            .attach(&mut session, "Algebra".into(), Some("t@example.com".into()))
            .await;

        assert!(matches!(outcome, MeetingOutcome::Skipped(_)));
        assert_eq!(mock.call_count(), 1);
    }
}
