//! Request and response bodies for the session endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Role, Timestamp};
use crate::domain::policy::{NoShowCharge, RefundQuote};
use crate::domain::session::{NoShowParty, Session, SessionStatus, SessionType};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to publish one open slot.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSlotRequest {
    /// Required for admins; providers always publish their own slots.
    #[serde(default)]
    pub provider_id: Option<String>,
    pub session_type: SessionType,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    pub start: Timestamp,
    pub end: Timestamp,
    pub price_cents: i64,
}

/// Request to open an availability window for one service.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishAvailabilityRequest {
    #[serde(default)]
    pub provider_id: Option<String>,
    pub service_name: String,
    pub session_type: SessionType,
    pub duration_minutes: u32,
    pub price_cents: i64,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookSessionRequest {
    /// Admins booking for a student name them here.
    #[serde(default)]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelSessionRequest {
    pub reason: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkNoShowRequest {
    pub party: NoShowParty,
}

/// Query string for `GET /api/sessions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSessionsParams {
    /// Comma separated wire statuses, e.g. `scheduled,completed`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub starts_after: Option<Timestamp>,
    #[serde(default)]
    pub starts_before: Option<Timestamp>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct MeetingResponse {
    pub join_url: String,
    pub meeting_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancellationResponse {
    pub cancelled_at: Timestamp,
    pub cancelled_by: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoShowResponse {
    pub marked_at: Timestamp,
    pub marked_by: String,
    pub party: NoShowParty,
}

/// A session as one viewer sees it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub status: SessionStatus,
    /// Human label for `status`, worded for the viewer's role.
    pub status_label: &'static str,
    pub student_id: Option<String>,
    pub provider_id: String,
    pub session_type: SessionType,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub scheduled_start: Timestamp,
    pub scheduled_end: Timestamp,
    pub duration_minutes: i64,
    pub price_cents: i64,
    pub amount_charged_cents: i64,
    pub amount_refunded_cents: i64,
    pub meeting: Option<MeetingResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_show: Option<NoShowResponse>,
    pub version: u64,
}

impl SessionResponse {
    pub fn for_viewer(session: &Session, viewer: Role) -> Self {
        Self {
            id: session.id().to_string(),
            status: session.status(),
            status_label: session.status().display_label(viewer),
            student_id: session.student_id().map(|id| id.to_string()),
            provider_id: session.provider_id().to_string(),
            session_type: session.session_type(),
            subject: session.subject().map(str::to_string),
            grade_level: session.grade_level().map(str::to_string),
            scheduled_start: session.scheduled_start(),
            scheduled_end: session.scheduled_end(),
            duration_minutes: session.duration_minutes(),
            price_cents: session.price_cents(),
            amount_charged_cents: session.amount_charged_cents(),
            amount_refunded_cents: session.amount_refunded_cents(),
            meeting: session.meeting().map(|m| MeetingResponse {
                join_url: m.join_url.clone(),
                meeting_id: m.meeting_id.clone(),
            }),
            cancellation: session.cancellation().map(|c| CancellationResponse {
                cancelled_at: c.cancelled_at,
                cancelled_by: c.cancelled_by.to_string(),
                reason: c.reason.clone(),
                note: c.note.clone(),
            }),
            no_show: session.no_show().map(|n| NoShowResponse {
                marked_at: n.marked_at,
                marked_by: n.marked_by.to_string(),
                party: n.party,
            }),
            version: session.version(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmPaymentResponse {
    pub session: SessionResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundQuoteResponse {
    pub refund_amount_cents: i64,
    pub is_full_charge: bool,
    pub hours_before_session: f64,
}

impl From<RefundQuote> for RefundQuoteResponse {
    fn from(quote: RefundQuote) -> Self {
        Self {
            refund_amount_cents: quote.refund_amount_cents,
            is_full_charge: quote.is_full_charge,
            hours_before_session: quote.hours_before_session,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CancelSessionResponse {
    pub session: SessionResponse,
    pub refund: RefundQuoteResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoShowChargeResponse {
    pub student_charge_cents: i64,
    pub provider_charge_cents: i64,
    pub refund_amount_cents: i64,
}

impl From<NoShowCharge> for NoShowChargeResponse {
    fn from(charge: NoShowCharge) -> Self {
        Self {
            student_charge_cents: charge.student_charge_cents,
            provider_charge_cents: charge.provider_charge_cents,
            refund_amount_cents: charge.refund_amount_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkNoShowResponse {
    pub session: SessionResponse,
    pub charge: NoShowChargeResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessRefundResponse {
    pub session: SessionResponse,
    pub refunded_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::fixtures;

    #[test]
    fn status_label_follows_viewer() {
        let session = fixtures::scheduled_session();

        let student = SessionResponse::for_viewer(&session, Role::Student);
        let provider = SessionResponse::for_viewer(&session, Role::Provider);

        assert_eq!(student.status_label, "Confirmed");
        assert_eq!(provider.status_label, "Upcoming");
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["status"], "scheduled");
        assert!(json.get("cancellation").is_none());
    }

    #[test]
    fn list_params_default_to_everything() {
        let params: ListSessionsParams = serde_json::from_str("{}").unwrap();
        assert!(params.status.is_none());
        assert!(params.starts_after.is_none());
    }
}
