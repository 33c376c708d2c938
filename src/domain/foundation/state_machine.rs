//! State machine trait for status enums.
//!
//! Provides a consistent interface for validating and performing state transitions
//! across lifecycle statuses such as `SessionStatus`.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for SessionStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         self.valid_transitions().contains(target)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Available => vec![Pending],
///             Pending => vec![Scheduled],
///             // ... etc
///         }
///     }
/// }
///
/// let next = session.status().transition_to(SessionStatus::Completed)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    ///
    /// This is the preferred way to change state, as it ensures
    /// the transition is valid according to the state machine rules.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "status",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SlotStatus {
        Open,
        Held,
        Taken,
        Released,
    }

    impl StateMachine for SlotStatus {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use SlotStatus::*;
            match self {
                Open => vec![Held],
                Held => vec![Taken, Released],
                Taken => vec![],
                Released => vec![Open],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(SlotStatus::Open.transition_to(SlotStatus::Held), Ok(SlotStatus::Held));
    }

    #[test]
    fn transition_to_reports_offending_states() {
        let err = SlotStatus::Open.transition_to(SlotStatus::Taken).unwrap_err();
        assert!(err.to_string().contains("Open"));
        assert!(err.to_string().contains("Taken"));
        assert_eq!(err.field(), Some("status"));
    }

    #[test]
    fn is_terminal_only_for_states_without_exits() {
        assert!(SlotStatus::Taken.is_terminal());
        assert!(!SlotStatus::Released.is_terminal());
        assert!(!SlotStatus::Open.is_terminal());
    }
}
