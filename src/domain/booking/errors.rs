//! Booking wizard errors.

use thiserror::Error;

use crate::domain::directory::ServiceKind;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

use super::draft::WizardStep;

/// Why a wizard action was refused. Every variant is a returned value;
/// the draft is never left half-updated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// The predicate for `step` does not hold.
    #[error("{step} is blocked: {reason}")]
    GateBlocked { step: WizardStep, reason: String },

    #[error("Unknown plan '{0}'")]
    UnknownPlan(String),

    #[error("Plan '{plan}' is not offered for {service}")]
    PlanServiceMismatch { plan: String, service: ServiceKind },

    /// A selector was set that the chosen service does not use.
    #[error("'{field}' does not apply to {service}")]
    NotApplicable {
        field: &'static str,
        service: ServiceKind,
    },

    #[error("Plan requires exactly {required} session(s); deselect one before adding another")]
    SlotLimitReached { required: usize },

    #[error("Provider '{0}' does not qualify for this booking")]
    ProviderNotQualifying(String),

    #[error("Booking is already finalized")]
    AlreadyComplete,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl BookingError {
    pub fn blocked(step: WizardStep, reason: impl Into<String>) -> Self {
        BookingError::GateBlocked {
            step,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::GateBlocked { .. } | BookingError::SlotLimitReached { .. } => {
                ErrorCode::GateBlocked
            }
            BookingError::UnknownPlan(_) => ErrorCode::PlanNotFound,
            BookingError::ProviderNotQualifying(_) => ErrorCode::ProviderNotFound,
            BookingError::AlreadyComplete => ErrorCode::InvalidStateTransition,
            BookingError::PlanServiceMismatch { .. }
            | BookingError::NotApplicable { .. }
            | BookingError::Invalid(_) => ErrorCode::ValidationFailed,
        }
    }
}

impl From<BookingError> for DomainError {
    fn from(err: BookingError) -> Self {
        let code = err.code();
        let domain = DomainError::new(code, err.to_string());
        match err {
            BookingError::GateBlocked { step, .. } => {
                domain.with_detail("step", step.number().to_string())
            }
            _ => domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_blocked_names_step() {
        let err = BookingError::blocked(WizardStep::Details, "choose a topic");
        assert_eq!(err.to_string(), "step 3 (details) is blocked: choose a topic");
        let domain: DomainError = err.into();
        assert_eq!(domain.code, ErrorCode::GateBlocked);
        assert_eq!(domain.details.get("step"), Some(&"3".to_string()));
    }

    #[test]
    fn codes_map_to_categories() {
        assert_eq!(BookingError::UnknownPlan("x".into()).code(), ErrorCode::PlanNotFound);
        assert_eq!(
            BookingError::SlotLimitReached { required: 4 }.code(),
            ErrorCode::GateBlocked
        );
        assert_eq!(
            BookingError::ProviderNotQualifying("p".into()).code(),
            ErrorCode::ProviderNotFound
        );
    }
}
