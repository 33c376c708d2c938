//! Session status state machine.
//!
//! ```text
//!  available ──book──► pending ──confirm──► scheduled ──complete──► completed
//!                                  ▲            │  │                    │
//!                paid (legacy) ────┘      cancel│  │no-show             │no-show
//!                                               ▼  ▼                    ▼
//!                                        cancelled  no-show ◄───────────┘
//!                                               │      │
//!                                               └──────┴──refund──► refunded
//! ```
//!
//! `scheduled` is the canonical "payment confirmed, session locked in"
//! state. `paid` exists only so legacy records still deserialize; the next
//! confirmation normalizes it to `scheduled`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Role, StateMachine, ValidationError};

/// Lifecycle status of a session. Wire strings are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Available,
    Pending,
    Paid,
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
    Refunded,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 8] = [
        SessionStatus::Available,
        SessionStatus::Pending,
        SessionStatus::Paid,
        SessionStatus::Scheduled,
        SessionStatus::Completed,
        SessionStatus::Cancelled,
        SessionStatus::NoShow,
        SessionStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Available => "available",
            SessionStatus::Pending => "pending",
            SessionStatus::Paid => "paid",
            SessionStatus::Scheduled => "scheduled",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::NoShow => "no-show",
            SessionStatus::Refunded => "refunded",
        }
    }

    /// Payment has been confirmed and the slot is locked in.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SessionStatus::Scheduled | SessionStatus::Paid)
    }

    /// Label shown to a viewer; confirmed sessions read differently per role.
    pub fn display_label(&self, viewer: Role) -> &'static str {
        match (self, viewer) {
            (SessionStatus::Scheduled | SessionStatus::Paid, Role::Student) => "Confirmed",
            (SessionStatus::Scheduled | SessionStatus::Paid, Role::Provider) => "Upcoming",
            (SessionStatus::Scheduled | SessionStatus::Paid, Role::Admin) => "Scheduled",
            (SessionStatus::Available, _) => "Available",
            (SessionStatus::Pending, _) => "Awaiting payment",
            (SessionStatus::Completed, _) => "Completed",
            (SessionStatus::Cancelled, _) => "Cancelled",
            (SessionStatus::NoShow, _) => "No-show",
            (SessionStatus::Refunded, _) => "Refunded",
        }
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Available => vec![Pending],
            Pending => vec![Scheduled],
            Paid => vec![Scheduled],
            Scheduled => vec![Completed, Cancelled, NoShow],
            Completed => vec![NoShow],
            Cancelled => vec![Refunded],
            NoShow => vec![Refunded],
            Refunded => vec![],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        SessionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| {
                ValidationError::invalid_format("status", format!("unknown status '{}'", s.trim()))
            })
    }
}

/// Kind of session, as stored on the record.
///
/// Virtual tours are counselor-led and stored as `counseling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    Tutoring,
    Counseling,
    TestPrep,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Tutoring => "Tutoring",
            SessionType::Counseling => "Counseling",
            SessionType::TestPrep => "Test prep",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<crate::domain::directory::ServiceKind> for SessionType {
    fn from(service: crate::domain::directory::ServiceKind) -> Self {
        use crate::domain::directory::ServiceKind;
        match service {
            ServiceKind::Tutoring => SessionType::Tutoring,
            ServiceKind::TestPrep => SessionType::TestPrep,
            ServiceKind::Counseling | ServiceKind::VirtualTour => SessionType::Counseling,
        }
    }
}
