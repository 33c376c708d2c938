//! Request and response bodies for checkout and the payment webhook.

use serde::{Deserialize, Serialize};

use crate::domain::booking::{BookingSelection, FinalizedBooking, Slot};

use super::super::session::SessionResponse;

/// Wizard answers plus who pays.
#[derive(Debug, Clone, Deserialize)]
pub struct StartCheckoutRequest {
    #[serde(flatten)]
    pub selection: BookingSelection,
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Admins start checkouts for a named student.
    #[serde(default)]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartCheckoutResponse {
    pub checkout_session_id: String,
    pub checkout_url: String,
    pub expires_at: i64,
    pub session_reference: String,
    pub booking: BookingSummary,
}

/// What the student is about to pay for.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSummary {
    pub description: String,
    pub plan_id: String,
    pub price_cents: i64,
    pub provider_id: String,
    pub provider_name: String,
    pub slots: Vec<Slot>,
}

impl From<&FinalizedBooking> for BookingSummary {
    fn from(booking: &FinalizedBooking) -> Self {
        Self {
            description: booking.description(),
            plan_id: booking.plan.id.clone(),
            price_cents: booking.price_cents(),
            provider_id: booking.provider_id.to_string(),
            provider_name: booking.provider_name.clone(),
            slots: booking.slots.clone(),
        }
    }
}

/// Sent by the client after the payment page redirects back.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteCheckoutRequest {
    pub checkout_session_id: String,
    pub selection: BookingSelection,
    #[serde(default)]
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteCheckoutResponse {
    pub sessions: Vec<SessionResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub already_processed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_created: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<String>,
}
