//! Session domain events.
//!
//! One event per lifecycle move. Every mutating method on `Session` returns
//! the event describing what it did; handlers publish it after the record
//! is stored.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainEvent, SessionId, Timestamp, UserId};

use super::NoShowParty;

/// Events published by the Session aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A provider published an open slot.
    SlotPublished {
        session_id: SessionId,
        provider_id: String,
        starts_at: Timestamp,
        occurred_at: Timestamp,
    },
    /// A student claimed an open slot.
    Booked {
        session_id: SessionId,
        student_id: UserId,
        booked_by: UserId,
        occurred_at: Timestamp,
    },
    /// Payment was confirmed and the session is locked in.
    Confirmed {
        session_id: SessionId,
        amount_charged_cents: i64,
        payment_reference: Option<String>,
        occurred_at: Timestamp,
    },
    /// A video meeting was attached to the session.
    MeetingAttached {
        session_id: SessionId,
        meeting_id: String,
        occurred_at: Timestamp,
    },
    Completed {
        session_id: SessionId,
        occurred_at: Timestamp,
    },
    Cancelled {
        session_id: SessionId,
        cancelled_by: UserId,
        reason: String,
        occurred_at: Timestamp,
    },
    MarkedNoShow {
        session_id: SessionId,
        party: NoShowParty,
        marked_by: UserId,
        occurred_at: Timestamp,
    },
    Refunded {
        session_id: SessionId,
        amount_refunded_cents: i64,
        occurred_at: Timestamp,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::SlotPublished { session_id, .. }
            | SessionEvent::Booked { session_id, .. }
            | SessionEvent::Confirmed { session_id, .. }
            | SessionEvent::MeetingAttached { session_id, .. }
            | SessionEvent::Completed { session_id, .. }
            | SessionEvent::Cancelled { session_id, .. }
            | SessionEvent::MarkedNoShow { session_id, .. }
            | SessionEvent::Refunded { session_id, .. } => *session_id,
        }
    }
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::SlotPublished { .. } => "session.slot_published.v1",
            SessionEvent::Booked { .. } => "session.booked.v1",
            SessionEvent::Confirmed { .. } => "session.confirmed.v1",
            SessionEvent::MeetingAttached { .. } => "session.meeting_attached.v1",
            SessionEvent::Completed { .. } => "session.completed.v1",
            SessionEvent::Cancelled { .. } => "session.cancelled.v1",
            SessionEvent::MarkedNoShow { .. } => "session.no_show.v1",
            SessionEvent::Refunded { .. } => "session.refunded.v1",
        }
    }

    fn aggregate_id(&self) -> String {
        self.session_id().to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "Session"
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            SessionEvent::SlotPublished { occurred_at, .. }
            | SessionEvent::Booked { occurred_at, .. }
            | SessionEvent::Confirmed { occurred_at, .. }
            | SessionEvent::MeetingAttached { occurred_at, .. }
            | SessionEvent::Completed { occurred_at, .. }
            | SessionEvent::Cancelled { occurred_at, .. }
            | SessionEvent::MarkedNoShow { occurred_at, .. }
            | SessionEvent::Refunded { occurred_at, .. } => *occurred_at,
        }
    }
}
