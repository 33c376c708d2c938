//! Session-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp, ValidationError};

use super::SessionStatus;

/// Session-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session was not found.
    NotFound(SessionId),
    /// Caller may not perform this action.
    Forbidden(String),
    /// The status machine does not allow this move.
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
    /// A scheduled session cannot be marked no-show before it starts.
    NoShowTooEarly { starts_at: Timestamp },
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Stored version moved on since the record was read.
    Conflict { expected: u64, actual: u64 },
    /// Payment collaborator reports the payment as unpaid.
    PaymentNotConfirmed(String),
    /// Payment collaborator failed.
    PaymentFailed(String),
    /// Infrastructure error.
    Infrastructure(String),
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }
    pub fn forbidden(message: impl Into<String>) -> Self {
        SessionError::Forbidden(message.into())
    }
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::Forbidden(_) => ErrorCode::Forbidden,
            SessionError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            SessionError::NoShowTooEarly { .. } => ErrorCode::InvalidStateTransition,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Conflict { .. } => ErrorCode::ConcurrencyConflict,
            SessionError::PaymentNotConfirmed(_) => ErrorCode::PaymentRequired,
            SessionError::PaymentFailed(_) => ErrorCode::PaymentProviderError,
            SessionError::Infrastructure(_) => ErrorCode::StorageError,
        }
    }
    pub fn message(&self) -> String {
        match self {
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::Forbidden(msg) => format!("Permission denied: {}", msg),
            SessionError::InvalidTransition { from, to } => {
                format!("Cannot move session from '{}' to '{}'", from, to)
            }
            SessionError::NoShowTooEarly { starts_at } => {
                format!("Session has not started yet (starts {})", starts_at)
            }
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::Conflict { expected, actual } => format!(
                "Session was modified concurrently (expected version {}, found {})",
                expected, actual
            ),
            SessionError::PaymentNotConfirmed(msg) => format!("Payment not confirmed: {}", msg),
            SessionError::PaymentFailed(msg) => format!("Payment provider error: {}", msg),
            SessionError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match err {
            SessionError::Conflict { expected, actual } => domain
                .with_detail("expected", expected.to_string())
                .with_detail("actual", actual.to_string()),
            SessionError::ValidationFailed { field, .. } => domain.with_detail("field", field),
            SessionError::NotFound(id) => domain.with_detail("session_id", id.to_string()),
            _ => domain,
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().unwrap_or("session").to_string();
        SessionError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::Forbidden | ErrorCode::Unauthorized => SessionError::Forbidden(err.message),
            ErrorCode::InvalidStateTransition => SessionError::Infrastructure(err.to_string()),
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => SessionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::ConcurrencyConflict => {
                let version = |key: &str| {
                    err.details
                        .get(key)
                        .and_then(|v| v.parse().ok())
                        .unwrap_or_default()
                };
                SessionError::Conflict {
                    expected: version("expected"),
                    actual: version("actual"),
                }
            }
            ErrorCode::PaymentRequired => SessionError::PaymentNotConfirmed(err.message),
            ErrorCode::PaymentProviderError => SessionError::PaymentFailed(err.message),
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}
