//! PaymentWebhookHandler - Signed checkout completions from the payment provider.
//!
//! The webhook is the server-side path to completion: the student may close
//! the browser before the success page loads. It runs the same idempotent
//! `CompleteCheckoutHandler`, so the success page and the webhook racing
//! each other create the sessions once.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::booking::BookingSelection;
use crate::domain::foundation::{Actor, CommandMetadata, DomainError, Role, UserId};
use crate::ports::{PaymentProvider, PaymentWebhookKind};

use super::complete_checkout::{CompleteCheckoutCommand, CompleteCheckoutHandler, CompleteCheckoutResult};
use super::start_checkout::{METADATA_BOOKING, METADATA_STUDENT};

/// User id recorded on events raised by webhook deliveries.
pub const SYSTEM_USER: &str = "system";

#[derive(Debug)]
pub enum WebhookOutcome {
    Completed(CompleteCheckoutResult),
    /// Verified, but not something this service acts on.
    Ignored(String),
}

pub struct PaymentWebhookHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    complete_checkout: Arc<CompleteCheckoutHandler>,
}

impl PaymentWebhookHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        complete_checkout: Arc<CompleteCheckoutHandler>,
    ) -> Self {
        Self {
            payment_provider,
            complete_checkout,
        }
    }

    pub async fn handle(&self, payload: &[u8], signature: &str) -> Result<WebhookOutcome, DomainError> {
        let webhook = self
            .payment_provider
            .verify_webhook(payload, signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "Webhook rejected");
                DomainError::from(e)
            })?;

        let (checkout_session_id, amount_total_cents, metadata) = match webhook.kind {
            PaymentWebhookKind::CheckoutCompleted {
                checkout_session_id,
                amount_total_cents,
                metadata,
                ..
            } => (checkout_session_id, amount_total_cents, metadata),
            PaymentWebhookKind::Other { event_type } => {
                tracing::debug!(event_id = %webhook.id, event_type = %event_type, "Webhook ignored");
                return Ok(WebhookOutcome::Ignored(event_type));
            }
        };

        let Some((selection, student_id)) = booking_from_metadata(&metadata)? else {
            tracing::info!(
                event_id = %webhook.id,
                checkout_id = %checkout_session_id,
                "Checkout carries no booking; ignored"
            );
            return Ok(WebhookOutcome::Ignored("checkout without booking".to_string()));
        };

        let system = Actor::new(UserId::new(SYSTEM_USER)?, Role::Admin);
        let command_metadata = CommandMetadata::new(system)
            .with_correlation_id(webhook.id.clone())
            .with_source("webhook");

        let result = self
            .complete_checkout
            .handle(
                CompleteCheckoutCommand {
                    checkout_session_id,
                    selection,
                    student_id,
                    amount_paid_cents: amount_total_cents,
                },
                command_metadata,
            )
            .await?;

        Ok(WebhookOutcome::Completed(result))
    }
}

/// `None` when the checkout was not opened by the booking flow.
fn booking_from_metadata(
    metadata: &BTreeMap<String, String>,
) -> Result<Option<(BookingSelection, UserId)>, DomainError> {
    let (Some(booking), Some(student)) = (metadata.get(METADATA_BOOKING), metadata.get(METADATA_STUDENT))
    else {
        return Ok(None);
    };
    let selection: BookingSelection = serde_json::from_str(booking)
        .map_err(|e| DomainError::validation(METADATA_BOOKING, e.to_string()))?;
    let student_id = UserId::new(student.clone())?;
    Ok(Some((selection, student_id)))
}
