//! Persisted JSON shape of a session.
//!
//! Field names are camelCase and timestamps ISO-8601 strings. Reading a record
//! back is fallible: every invariant of `Session` is re-checked.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AvailabilityId, ServiceTypeId, SessionId, Timestamp, UserId, ValidationError,
};

use super::{
    Cancellation, MeetingLink, NoShowMark, NoShowParty, Session, SessionStatus, SessionType,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    #[serde(default)]
    pub student_id: Option<String>,
    pub provider_id: String,
    #[serde(default)]
    pub service_type_id: Option<ServiceTypeId>,
    pub session_type: SessionType,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    pub scheduled_start_time: Timestamp,
    pub scheduled_end_time: Timestamp,
    pub status: SessionStatus,
    pub price_cents: i64,
    #[serde(default)]
    pub amount_charged_cents: i64,
    #[serde(default)]
    pub amount_refunded_cents: i64,
    #[serde(default)]
    pub cancelled_at: Option<Timestamp>,
    #[serde(default)]
    pub cancelled_by: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub cancellation_note: Option<String>,
    #[serde(default)]
    pub marked_no_show_at: Option<Timestamp>,
    #[serde(default)]
    pub marked_no_show_by: Option<String>,
    #[serde(default)]
    pub no_show_party: Option<NoShowParty>,
    #[serde(default)]
    pub booked_at: Option<Timestamp>,
    #[serde(default)]
    pub booked_by: Option<String>,
    #[serde(default)]
    pub availability_id: Option<AvailabilityId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_join_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<String>,
    #[serde(default)]
    pub version: u64,
}

/// Blank strings from older writers mean "unset".
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn user(value: Option<String>) -> Result<Option<UserId>, ValidationError> {
    present(value).map(UserId::new).transpose()
}

impl TryFrom<SessionRecord> for Session {
    type Error = ValidationError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let cancellation = match (record.cancelled_at, user(record.cancelled_by)?) {
            (Some(cancelled_at), Some(cancelled_by)) => Some(Cancellation {
                cancelled_at,
                cancelled_by,
                reason: present(record.cancellation_reason)
                    .unwrap_or_else(|| "unspecified".to_string()),
                note: present(record.cancellation_note),
            }),
            (None, None) => None,
            _ => {
                return Err(ValidationError::invariant(
                    "cancelledAt and cancelledBy must be set together",
                ))
            }
        };

        let no_show = match (
            record.marked_no_show_at,
            user(record.marked_no_show_by)?,
            record.no_show_party,
        ) {
            (Some(marked_at), Some(marked_by), Some(party)) => Some(NoShowMark {
                marked_at,
                marked_by,
                party,
            }),
            (None, None, None) => None,
            _ => {
                return Err(ValidationError::invariant(
                    "markedNoShowAt, markedNoShowBy and noShowParty must be set together",
                ))
            }
        };

        let meeting = match (present(record.meeting_join_url), record.meeting_id) {
            (Some(join_url), meeting_id) => Some(MeetingLink {
                join_url,
                meeting_id: meeting_id.unwrap_or_default(),
            }),
            (None, _) => None,
        };

        Session::reconstitute(
            record.id,
            user(record.student_id)?,
            record.provider_id,
            record.service_type_id,
            record.availability_id,
            record.session_type,
            present(record.subject),
            present(record.grade_level),
            record.scheduled_start_time,
            record.scheduled_end_time,
            record.status,
            record.price_cents,
            record.amount_charged_cents,
            record.amount_refunded_cents,
            cancellation,
            no_show,
            record.booked_at,
            user(record.booked_by)?,
            present(record.payment_reference),
            meeting,
            record.created_at,
            record.updated_at,
            record.version,
        )
    }
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        let cancellation = session.cancellation();
        let no_show = session.no_show();
        let meeting = session.meeting();
        Self {
            id: session.id(),
            student_id: session.student_id().map(|id| id.to_string()),
            provider_id: session.provider_id().to_string(),
            service_type_id: session.service_type_id(),
            session_type: session.session_type(),
            subject: session.subject().map(str::to_string),
            grade_level: session.grade_level().map(str::to_string),
            scheduled_start_time: session.scheduled_start(),
            scheduled_end_time: session.scheduled_end(),
            status: session.status(),
            price_cents: session.price_cents(),
            amount_charged_cents: session.amount_charged_cents(),
            amount_refunded_cents: session.amount_refunded_cents(),
            cancelled_at: cancellation.map(|c| c.cancelled_at),
            cancelled_by: cancellation.map(|c| c.cancelled_by.to_string()),
            cancellation_reason: cancellation.map(|c| c.reason.clone()),
            cancellation_note: cancellation.and_then(|c| c.note.clone()),
            marked_no_show_at: no_show.map(|n| n.marked_at),
            marked_no_show_by: no_show.map(|n| n.marked_by.to_string()),
            no_show_party: no_show.map(|n| n.party),
            booked_at: session.booked_at(),
            booked_by: session.booked_by().map(|id| id.to_string()),
            availability_id: session.availability_id(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
            payment_reference: session.payment_reference().map(str::to_string),
            meeting_join_url: meeting.map(|m| m.join_url.clone()),
            meeting_id: meeting.map(|m| m.meeting_id.clone()),
            version: session.version(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Actor, Role};
    use crate::domain::session::aggregate::tests::{open_slot, scheduled_session, start, student};
    use serde_json::json;

    #[test]
    fn record_uses_camel_case_wire_names() {
        let record = SessionRecord::from(&scheduled_session());
        let json = serde_json::to_value(&record).unwrap();

        for key in [
            "studentId",
            "providerId",
            "sessionType",
            "scheduledStartTime",
            "scheduledEndTime",
            "priceCents",
            "amountChargedCents",
            "amountRefundedCents",
            "bookedAt",
            "createdAt",
            "updatedAt",
            "paymentReference",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["status"], "scheduled");
        assert_eq!(json["scheduledStartTime"], "2025-06-02T16:00:00Z");
    }

    #[test]
    fn cancelled_session_survives_storage() {
        let mut session = scheduled_session();
        session
            .cancel(
                &Actor::new(student(), Role::Student),
                "sick",
                Some("fever".into()),
                start().minus_hours(30),
            )
            .unwrap();

        let json = serde_json::to_string(&SessionRecord::from(&session)).unwrap();
        let record: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.cancellation_note.as_deref(), Some("fever"));
        assert_eq!(Session::try_from(record).unwrap(), session);
    }

    #[test]
    fn legacy_empty_student_reads_as_unbooked() {
        let mut json = serde_json::to_value(SessionRecord::from(&open_slot())).unwrap();
        json["studentId"] = json!("");

        let record: SessionRecord = serde_json::from_value(json).unwrap();
        let session = Session::try_from(record).unwrap();
        assert!(session.student_id().is_none());
    }

    #[test]
    fn legacy_paid_status_loads() {
        let mut json = serde_json::to_value(SessionRecord::from(&scheduled_session())).unwrap();
        json["status"] = json!("paid");

        let record: SessionRecord = serde_json::from_value(json).unwrap();
        let session = Session::try_from(record).unwrap();
        assert_eq!(session.status(), SessionStatus::Paid);
    }

    #[test]
    fn refund_above_charge_is_rejected_on_read() {
        let mut record = SessionRecord::from(&scheduled_session());
        record.status = SessionStatus::Refunded;
        record.amount_refunded_cents = 9000;
        record.cancelled_at = Some(start());
        record.cancelled_by = Some("student-1".into());
        assert!(Session::try_from(record).is_err());
    }

    #[test]
    fn cancellation_fields_without_status_are_rejected() {
        let mut record = SessionRecord::from(&scheduled_session());
        record.cancelled_at = Some(start());
        record.cancelled_by = Some("student-1".into());
        assert!(Session::try_from(record).is_err());
    }

    #[test]
    fn unknown_status_fails_to_parse() {
        let mut json = serde_json::to_value(SessionRecord::from(&open_slot())).unwrap();
        json["status"] = json!("booked");
        assert!(serde_json::from_value::<SessionRecord>(json).is_err());
    }

    #[test]
    fn placeholder_provider_still_loads() {
        let mut record = SessionRecord::from(&open_slot());
        record.provider_id = "undefined".into();
        let session = Session::try_from(record).unwrap();
        assert_eq!(session.provider_id(), "undefined");
    }
}
