//! StartCheckoutHandler - Finalized wizard answers become a hosted checkout.
//!
//! The client's answers are replayed through every wizard gate against the
//! live directory and plan catalog; nothing the client computed (price,
//! provider name, slot count) is trusted. The selection travels in the
//! checkout metadata so completion can rebuild the same booking.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::booking::{BookingContext, BookingDraft, BookingSelection, FinalizedBooking, PlanCatalog};
use crate::domain::directory::ProviderDirectory;
use crate::domain::foundation::{AuthorizationResult, CommandMetadata, DomainError, Role, UserId};
use crate::ports::{CheckoutRequest, CheckoutSession, PaymentProvider};

/// Metadata key holding the serialized `BookingSelection`.
pub const METADATA_BOOKING: &str = "booking";
/// Metadata key holding the paying student's id.
pub const METADATA_STUDENT: &str = "student_id";

#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    pub selection: BookingSelection,
    pub customer_email: Option<String>,
    /// Admins start checkouts for a named student.
    pub on_behalf_of: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct StartCheckoutResult {
    pub checkout: CheckoutSession,
    pub booking: FinalizedBooking,
    pub session_reference: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

pub struct StartCheckoutHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    directory: Arc<ProviderDirectory>,
    plans: Arc<PlanCatalog>,
    urls: CheckoutUrls,
}

impl StartCheckoutHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        directory: Arc<ProviderDirectory>,
        plans: Arc<PlanCatalog>,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            payment_provider,
            directory,
            plans,
            urls,
        }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
        metadata: CommandMetadata,
    ) -> Result<StartCheckoutResult, DomainError> {
        let actor = &metadata.actor;
        let student_id = resolve_student(actor.role, &actor.user_id, cmd.on_behalf_of)?;
        AuthorizationResult::decide(
            matches!(actor.role, Role::Student | Role::Admin),
            actor,
            "checkout",
            "Booking",
            student_id.as_str(),
        )
        .into_result()?;

        let ctx = BookingContext::new(&self.directory, &self.plans);
        let booking = BookingDraft::replay(&cmd.selection, ctx)?;

        let selection_json = serde_json::to_string(&cmd.selection)
            .map_err(|e| DomainError::validation("selection", e.to_string()))?;
        let mut checkout_metadata = BTreeMap::new();
        checkout_metadata.insert(METADATA_BOOKING.to_string(), selection_json);
        checkout_metadata.insert(METADATA_STUDENT.to_string(), student_id.to_string());

        let session_reference = uuid::Uuid::new_v4().to_string();
        let request = CheckoutRequest {
            session_reference: session_reference.clone(),
            amount_cents: booking.price_cents(),
            description: booking.description(),
            customer_email: cmd.customer_email,
            success_url: self.urls.success_url.clone(),
            cancel_url: self.urls.cancel_url.clone(),
            metadata: checkout_metadata,
        };

        let checkout = self
            .payment_provider
            .create_checkout_session(request)
            .await
            .map_err(|e| {
                tracing::error!(student_id = %student_id, error = %e, "Checkout creation failed");
                DomainError::from(e)
            })?;

        tracing::info!(
            checkout_id = %checkout.id,
            student_id = %student_id,
            provider_id = %booking.provider_id,
            plan = %booking.plan.id,
            amount_cents = booking.price_cents(),
            "Checkout started"
        );

        Ok(StartCheckoutResult {
            checkout,
            booking,
            session_reference,
        })
    }
}

fn resolve_student(
    role: Role,
    actor_id: &UserId,
    on_behalf_of: Option<UserId>,
) -> Result<UserId, DomainError> {
    match (role, on_behalf_of) {
        (Role::Admin, Some(student)) => Ok(student),
        (Role::Admin, None) => Err(DomainError::validation(
            "student_id",
            "admins must name the student they book for",
        )),
        (_, _) => Ok(actor_id.clone()),
    }
}
