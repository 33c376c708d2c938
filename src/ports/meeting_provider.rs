//! Video meeting port.
//!
//! Meeting creation is best effort: a failure never undoes a confirmed
//! booking, the caller logs it and carries on without a join link.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::Timestamp;
use crate::domain::session::MeetingLink;

#[derive(Debug, Clone)]
pub struct MeetingRequest {
    pub topic: String,
    pub start: Timestamp,
    pub duration_minutes: u32,
    pub host_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeetingError {
    #[error("meeting provider unreachable: {0}")]
    Unavailable(String),

    #[error("meeting provider rejected the request: {0}")]
    Rejected(String),

    #[error("unexpected meeting provider response: {0}")]
    InvalidResponse(String),
}

impl MeetingError {
    /// Worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, MeetingError::Unavailable(_))
    }
}

#[async_trait]
pub trait MeetingProvider: Send + Sync {
    async fn create_meeting(&self, request: MeetingRequest) -> Result<MeetingLink, MeetingError>;
}
