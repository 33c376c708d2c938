//! Mock meeting provider for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::session::MeetingLink;
use crate::ports::{MeetingError, MeetingProvider, MeetingRequest};

/// Hands out `https://meet.test/<n>` links.
///
/// Queued failures are returned first, one per call, so tests can exercise
/// retry behavior.
#[derive(Debug, Default)]
pub struct MockMeetingProvider {
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    failures: VecDeque<MeetingError>,
    always_fail: Option<MeetingError>,
    requests: Vec<MeetingRequest>,
    created: u64,
}

impl MockMeetingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that fails every call with `error`.
    pub fn failing(error: MeetingError) -> Self {
        let mock = Self::new();
        mock.state().always_fail = Some(error);
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the next call with `error`.
    pub fn push_failure(&self, error: MeetingError) {
        self.state().failures.push_back(error);
    }

    /// Every request received, including failed ones.
    pub fn requests(&self) -> Vec<MeetingRequest> {
        self.state().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }
}

#[async_trait]
impl MeetingProvider for MockMeetingProvider {
    async fn create_meeting(&self, request: MeetingRequest) -> Result<MeetingLink, MeetingError> {
        let mut state = self.state();
        state.requests.push(request);

        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        if let Some(error) = &state.always_fail {
            return Err(error.clone());
        }

        state.created += 1;
        Ok(MeetingLink {
            join_url: format!("https://meet.test/{}", state.created),
            meeting_id: format!("mtg-{}", state.created),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn request() -> MeetingRequest {
        MeetingRequest {
            topic: "Algebra".into(),
            start: Timestamp::now(),
            duration_minutes: 60,
            host_email: None,
        }
    }

    #[tokio::test]
    async fn queued_failures_come_first() {
        let mock = MockMeetingProvider::new();
        mock.push_failure(MeetingError::Unavailable("timeout".into()));

        assert!(mock.create_meeting(request()).await.is_err());
        let link = mock.create_meeting(request()).await.unwrap();
        assert_eq!(link.join_url, "https://meet.test/1");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn failing_mock_never_succeeds() {
        let mock = MockMeetingProvider::failing(MeetingError::Rejected("no host".into()));
        for _ in 0..3 {
            assert!(mock.create_meeting(request()).await.is_err());
        }
    }
}
