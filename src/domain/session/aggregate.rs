//! Session aggregate entity.
//!
//! A session is one bookable or booked appointment between a student and a
//! provider. All status changes go through the methods here, which validate
//! first and mutate second, so a rejected call leaves the session untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    Actor, AvailabilityId, Authorizable, ProviderId, ServiceTypeId, SessionId, StateMachine,
    Timestamp, UserId, ValidationError,
};

use super::{SessionError, SessionEvent, SessionStatus, SessionType};

/// Who failed to show up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoShowParty {
    Student,
    Provider,
    Both,
}

impl NoShowParty {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoShowParty::Student => "student",
            NoShowParty::Provider => "provider",
            NoShowParty::Both => "both",
        }
    }
}

impl fmt::Display for NoShowParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoShowParty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(NoShowParty::Student),
            "provider" => Ok(NoShowParty::Provider),
            "both" => Ok(NoShowParty::Both),
            other => Err(ValidationError::invalid_format(
                "no_show_party",
                format!("unknown party '{}'", other),
            )),
        }
    }
}

/// Cancellation details, present only on cancelled (or later refunded) sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub cancelled_at: Timestamp,
    pub cancelled_by: UserId,
    pub reason: String,
    pub note: Option<String>,
}

/// No-show details, present only on no-show (or later refunded) sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoShowMark {
    pub marked_at: Timestamp,
    pub marked_by: UserId,
    pub party: NoShowParty,
}

/// Video meeting attached after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingLink {
    pub join_url: String,
    pub meeting_id: String,
}

/// Everything a provider supplies when publishing an open slot.
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub provider_id: ProviderId,
    pub service_type_id: Option<ServiceTypeId>,
    pub availability_id: Option<AvailabilityId>,
    pub session_type: SessionType,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub start: Timestamp,
    pub end: Timestamp,
    pub price_cents: i64,
}

/// One paid slot from a completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutBooking {
    pub student_id: UserId,
    pub provider_id: ProviderId,
    pub session_type: SessionType,
    pub subject: Option<String>,
    pub start: Timestamp,
    pub end: Timestamp,
    pub price_cents: i64,
    pub amount_charged_cents: i64,
    pub payment_reference: String,
}

/// Session aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    student_id: Option<UserId>,
    /// Kept raw so legacy records with a placeholder provider still load;
    /// `book` refuses to proceed until it parses as a `ProviderId`.
    provider_id: String,
    service_type_id: Option<ServiceTypeId>,
    availability_id: Option<AvailabilityId>,
    session_type: SessionType,
    subject: Option<String>,
    grade_level: Option<String>,
    scheduled_start: Timestamp,
    scheduled_end: Timestamp,
    status: SessionStatus,
    price_cents: i64,
    amount_charged_cents: i64,
    amount_refunded_cents: i64,
    cancellation: Option<Cancellation>,
    no_show: Option<NoShowMark>,
    booked_at: Option<Timestamp>,
    booked_by: Option<UserId>,
    payment_reference: Option<String>,
    meeting: Option<MeetingLink>,
    created_at: Timestamp,
    updated_at: Timestamp,
    version: u64,
}

impl Session {
    /// Publishes an open slot in `available` status.
    pub fn new_available(slot: NewSlot, now: Timestamp) -> Result<(Self, SessionEvent), SessionError> {
        let session = Self {
            id: SessionId::new(),
            student_id: None,
            provider_id: slot.provider_id.as_str().to_string(),
            service_type_id: slot.service_type_id,
            availability_id: slot.availability_id,
            session_type: slot.session_type,
            subject: clean(slot.subject),
            grade_level: clean(slot.grade_level),
            scheduled_start: slot.start,
            scheduled_end: slot.end,
            status: SessionStatus::Available,
            price_cents: slot.price_cents,
            amount_charged_cents: 0,
            amount_refunded_cents: 0,
            cancellation: None,
            no_show: None,
            booked_at: None,
            booked_by: None,
            payment_reference: None,
            meeting: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        session.validate()?;

        let event = SessionEvent::SlotPublished {
            session_id: session.id,
            provider_id: session.provider_id.clone(),
            starts_at: session.scheduled_start,
            occurred_at: now,
        };
        Ok((session, event))
    }

    /// Synthesizes an already-paid `scheduled` session from a checkout.
    pub fn from_checkout(
        booking: CheckoutBooking,
        now: Timestamp,
    ) -> Result<(Self, SessionEvent), SessionError> {
        let reference = booking.payment_reference.trim().to_string();
        if reference.is_empty() {
            return Err(ValidationError::empty_field("payment_reference").into());
        }

        let session = Self {
            id: SessionId::new(),
            student_id: Some(booking.student_id.clone()),
            provider_id: booking.provider_id.as_str().to_string(),
            service_type_id: None,
            availability_id: None,
            session_type: booking.session_type,
            subject: clean(booking.subject),
            grade_level: None,
            scheduled_start: booking.start,
            scheduled_end: booking.end,
            status: SessionStatus::Scheduled,
            price_cents: booking.price_cents,
            amount_charged_cents: booking.amount_charged_cents,
            amount_refunded_cents: 0,
            cancellation: None,
            no_show: None,
            booked_at: Some(now),
            booked_by: Some(booking.student_id),
            payment_reference: Some(reference.clone()),
            meeting: None,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        session.validate()?;

        let event = SessionEvent::Confirmed {
            session_id: session.id,
            amount_charged_cents: session.amount_charged_cents,
            payment_reference: Some(reference),
            occurred_at: now,
        };
        Ok((session, event))
    }

    /// Reconstitutes a session from storage; invariants are re-checked.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        student_id: Option<UserId>,
        provider_id: String,
        service_type_id: Option<ServiceTypeId>,
        availability_id: Option<AvailabilityId>,
        session_type: SessionType,
        subject: Option<String>,
        grade_level: Option<String>,
        scheduled_start: Timestamp,
        scheduled_end: Timestamp,
        status: SessionStatus,
        price_cents: i64,
        amount_charged_cents: i64,
        amount_refunded_cents: i64,
        cancellation: Option<Cancellation>,
        no_show: Option<NoShowMark>,
        booked_at: Option<Timestamp>,
        booked_by: Option<UserId>,
        payment_reference: Option<String>,
        meeting: Option<MeetingLink>,
        created_at: Timestamp,
        updated_at: Timestamp,
        version: u64,
    ) -> Result<Self, ValidationError> {
        let session = Self {
            id,
            student_id,
            provider_id,
            service_type_id,
            availability_id,
            session_type,
            subject,
            grade_level,
            scheduled_start,
            scheduled_end,
            status,
            price_cents,
            amount_charged_cents,
            amount_refunded_cents,
            cancellation,
            no_show,
            booked_at,
            booked_by,
            payment_reference,
            meeting,
            created_at,
            updated_at,
            version,
        };
        session.validate()?;
        Ok(session)
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn student_id(&self) -> Option<&UserId> {
        self.student_id.as_ref()
    }

    /// Provider id as stored; may be a legacy placeholder.
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn service_type_id(&self) -> Option<ServiceTypeId> {
        self.service_type_id
    }

    pub fn availability_id(&self) -> Option<AvailabilityId> {
        self.availability_id
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn grade_level(&self) -> Option<&str> {
        self.grade_level.as_deref()
    }

    pub fn scheduled_start(&self) -> Timestamp {
        self.scheduled_start
    }

    pub fn scheduled_end(&self) -> Timestamp {
        self.scheduled_end
    }

    pub fn duration_minutes(&self) -> i64 {
        self.scheduled_end
            .duration_since(&self.scheduled_start)
            .num_minutes()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn price_cents(&self) -> i64 {
        self.price_cents
    }

    pub fn amount_charged_cents(&self) -> i64 {
        self.amount_charged_cents
    }

    pub fn amount_refunded_cents(&self) -> i64 {
        self.amount_refunded_cents
    }

    pub fn cancellation(&self) -> Option<&Cancellation> {
        self.cancellation.as_ref()
    }

    pub fn no_show(&self) -> Option<&NoShowMark> {
        self.no_show.as_ref()
    }

    pub fn booked_at(&self) -> Option<Timestamp> {
        self.booked_at
    }

    pub fn booked_by(&self) -> Option<&UserId> {
        self.booked_by.as_ref()
    }

    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_reference.as_deref()
    }

    pub fn meeting(&self) -> Option<&MeetingLink> {
        self.meeting.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Storage version used for optimistic concurrency.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Set by repositories after a successful write.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    // ───────────────────────────────────────────────────────────────
    // Ownership
    // ───────────────────────────────────────────────────────────────

    pub fn is_student(&self, user_id: &UserId) -> bool {
        self.student_id.as_ref() == Some(user_id)
    }

    pub fn is_provider(&self, user_id: &UserId) -> bool {
        self.provider_id.trim() == user_id.as_str()
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// `available → pending`: a student claims the slot.
    pub fn book(
        &mut self,
        student_id: UserId,
        booked_by: UserId,
        now: Timestamp,
    ) -> Result<SessionEvent, SessionError> {
        ProviderId::new(self.provider_id.as_str())?;
        self.ensure_transition(SessionStatus::Pending)?;

        self.status = SessionStatus::Pending;
        self.student_id = Some(student_id.clone());
        self.booked_at = Some(now);
        self.booked_by = Some(booked_by.clone());
        self.updated_at = now;

        Ok(SessionEvent::Booked {
            session_id: self.id,
            student_id,
            booked_by,
            occurred_at: now,
        })
    }

    /// `pending|paid → scheduled`: payment is confirmed.
    pub fn confirm_payment(
        &mut self,
        amount_charged_cents: i64,
        payment_reference: Option<String>,
        now: Timestamp,
    ) -> Result<SessionEvent, SessionError> {
        if amount_charged_cents < 0 {
            return Err(ValidationError::out_of_range(
                "amount_charged_cents",
                0,
                i64::MAX,
                amount_charged_cents,
            )
            .into());
        }
        self.ensure_transition(SessionStatus::Scheduled)?;

        let payment_reference = clean(payment_reference).or_else(|| self.payment_reference.clone());
        self.status = SessionStatus::Scheduled;
        self.amount_charged_cents = amount_charged_cents;
        self.payment_reference = payment_reference.clone();
        self.updated_at = now;

        Ok(SessionEvent::Confirmed {
            session_id: self.id,
            amount_charged_cents,
            payment_reference,
            occurred_at: now,
        })
    }

    /// Attaches the video meeting; only confirmed sessions carry one.
    pub fn attach_meeting(
        &mut self,
        meeting: MeetingLink,
        now: Timestamp,
    ) -> Result<SessionEvent, SessionError> {
        if !self.status.is_confirmed() {
            return Err(SessionError::validation(
                "meeting",
                format!("cannot attach a meeting to a '{}' session", self.status),
            ));
        }
        if meeting.join_url.trim().is_empty() {
            return Err(ValidationError::empty_field("meeting_join_url").into());
        }

        let meeting_id = meeting.meeting_id.clone();
        self.meeting = Some(meeting);
        self.updated_at = now;

        Ok(SessionEvent::MeetingAttached {
            session_id: self.id,
            meeting_id,
            occurred_at: now,
        })
    }

    /// `scheduled → completed`.
    pub fn complete(&mut self, now: Timestamp) -> Result<SessionEvent, SessionError> {
        self.ensure_transition(SessionStatus::Completed)?;
        self.status = SessionStatus::Completed;
        self.updated_at = now;
        Ok(SessionEvent::Completed {
            session_id: self.id,
            occurred_at: now,
        })
    }

    /// `scheduled → cancelled`, recording who cancelled and why.
    pub fn cancel(
        &mut self,
        by: &Actor,
        reason: &str,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<SessionEvent, SessionError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::empty_field("cancellation_reason").into());
        }
        self.ensure_transition(SessionStatus::Cancelled)?;

        self.status = SessionStatus::Cancelled;
        self.cancellation = Some(Cancellation {
            cancelled_at: now,
            cancelled_by: by.user_id.clone(),
            reason: reason.to_string(),
            note: clean(note),
        });
        self.updated_at = now;

        Ok(SessionEvent::Cancelled {
            session_id: self.id,
            cancelled_by: by.user_id.clone(),
            reason: reason.to_string(),
            occurred_at: now,
        })
    }

    /// `scheduled|completed → no-show`.
    ///
    /// A scheduled session can only be marked once its start time has passed.
    pub fn mark_no_show(
        &mut self,
        party: NoShowParty,
        by: &Actor,
        now: Timestamp,
    ) -> Result<SessionEvent, SessionError> {
        self.ensure_transition(SessionStatus::NoShow)?;
        if self.status.is_confirmed() && now.is_before(&self.scheduled_start) {
            return Err(SessionError::NoShowTooEarly {
                starts_at: self.scheduled_start,
            });
        }

        self.status = SessionStatus::NoShow;
        self.no_show = Some(NoShowMark {
            marked_at: now,
            marked_by: by.user_id.clone(),
            party,
        });
        self.updated_at = now;

        Ok(SessionEvent::MarkedNoShow {
            session_id: self.id,
            party,
            marked_by: by.user_id.clone(),
            occurred_at: now,
        })
    }

    /// `cancelled|no-show → refunded`. Cancellation and no-show details stay.
    pub fn mark_refunded(
        &mut self,
        amount_refunded_cents: i64,
        now: Timestamp,
    ) -> Result<SessionEvent, SessionError> {
        if amount_refunded_cents <= 0 || amount_refunded_cents > self.amount_charged_cents {
            return Err(ValidationError::out_of_range(
                "amount_refunded_cents",
                1,
                self.amount_charged_cents,
                amount_refunded_cents,
            )
            .into());
        }
        self.ensure_transition(SessionStatus::Refunded)?;

        self.status = SessionStatus::Refunded;
        self.amount_refunded_cents = amount_refunded_cents;
        self.updated_at = now;

        Ok(SessionEvent::Refunded {
            session_id: self.id,
            amount_refunded_cents,
            occurred_at: now,
        })
    }

    fn ensure_transition(&self, target: SessionStatus) -> Result<(), SessionError> {
        if self.status.can_transition_to(&target) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.status,
                to: target,
            })
        }
    }

    /// Record-level invariants checked on every construction path.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.scheduled_end.is_after(&self.scheduled_start) {
            return Err(ValidationError::invariant("session must end after it starts"));
        }
        for (field, value) in [
            ("price_cents", self.price_cents),
            ("amount_charged_cents", self.amount_charged_cents),
            ("amount_refunded_cents", self.amount_refunded_cents),
        ] {
            if value < 0 {
                return Err(ValidationError::out_of_range(field, 0, i64::MAX, value));
            }
        }
        if self.amount_refunded_cents > self.amount_charged_cents {
            return Err(ValidationError::out_of_range(
                "amount_refunded_cents",
                0,
                self.amount_charged_cents,
                self.amount_refunded_cents,
            ));
        }

        match (self.status, &self.student_id) {
            (SessionStatus::Available, Some(_)) => {
                return Err(ValidationError::invariant("an available session has no student"))
            }
            (status, None) if status != SessionStatus::Available => {
                return Err(ValidationError::invariant(format!("a '{}' session needs a student", status)))
            }
            _ => {}
        }

        let cancelled = self.cancellation.is_some();
        let no_show = self.no_show.is_some();
        let consistent = match self.status {
            SessionStatus::Cancelled => cancelled && !no_show,
            SessionStatus::NoShow => no_show && !cancelled,
            SessionStatus::Refunded => cancelled != no_show,
            _ => !cancelled && !no_show,
        };
        if !consistent {
            return Err(ValidationError::invariant(format!(
                "cancellation/no-show details do not match status '{}'",
                self.status
            )));
        }

        if self.amount_refunded_cents > 0 && self.status != SessionStatus::Refunded {
            return Err(ValidationError::invariant("only refunded sessions carry a refund"));
        }
        Ok(())
    }
}

impl Authorizable for Session {
    const RESOURCE_TYPE: &'static str = "Session";

    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
