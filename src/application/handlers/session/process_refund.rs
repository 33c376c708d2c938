//! ProcessRefundHandler - Issues what the policy says is owed, then marks refunded.
//!
//! Cancelled sessions are priced by the cancellation policy at the moment
//! they were cancelled; no-shows by the no-show policy. When nothing is owed
//! the session is left as it is.

use std::sync::Arc;

use crate::domain::foundation::{authorize, CommandMetadata, SessionId, Timestamp};
use crate::domain::policy::{calculate_no_show_charge, calculate_refund, can_refund_session};
use crate::domain::session::{Session, SessionError, SessionStatus};
use crate::ports::{EventPublisher, PaymentProvider, RefundRequest, SessionRepository};

use super::common::{load, persist, publish};

#[derive(Debug, Clone)]
pub struct ProcessRefundCommand {
    pub session_id: SessionId,
}

#[derive(Debug, Clone)]
pub struct ProcessRefundResult {
    pub session: Session,
    pub refunded_cents: i64,
    /// Payment provider's refund id, when money moved.
    pub refund_id: Option<String>,
}

pub struct ProcessRefundHandler {
    repository: Arc<dyn SessionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ProcessRefundHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            payment_provider,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProcessRefundCommand,
        metadata: CommandMetadata,
    ) -> Result<ProcessRefundResult, SessionError> {
        let actor = &metadata.actor;
        let mut session = load(self.repository.as_ref(), cmd.session_id).await?;
        authorize(can_refund_session(&session, actor), actor, "refund", &session)?;

        let amount = owed(&session)?;
        if amount == 0 {
            tracing::info!(session_id = %session.id(), "Nothing to refund");
            return Ok(ProcessRefundResult {
                session,
                refunded_cents: 0,
                refund_id: None,
            });
        }

        let reference = session
            .payment_reference()
            .map(str::to_string)
            .ok_or_else(|| {
                SessionError::validation("payment_reference", "session has no recorded payment")
            })?;

        let refund = self
            .payment_provider
            .create_refund(RefundRequest {
                payment_reference: reference,
                amount_cents: amount,
                refund_reference: session.id().to_string(),
            })
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session.id(), error = %e, "Refund failed");
                SessionError::PaymentFailed(e.to_string())
            })?;

        let event = session.mark_refunded(amount, Timestamp::now())?;
        persist(self.repository.as_ref(), &mut session).await?;
        publish(self.event_publisher.as_ref(), &event, &metadata).await;

        tracing::info!(
            session_id = %session.id(),
            refund_id = %refund.id,
            amount_cents = amount,
            "Session refunded"
        );
        Ok(ProcessRefundResult {
            session,
            refunded_cents: amount,
            refund_id: Some(refund.id),
        })
    }
}

fn owed(session: &Session) -> Result<i64, SessionError> {
    match (session.status(), session.cancellation(), session.no_show()) {
        (SessionStatus::Cancelled, Some(cancellation), _) => {
            Ok(calculate_refund(session, cancellation.cancelled_at).refund_amount_cents)
        }
        (SessionStatus::NoShow, _, Some(mark)) => {
            Ok(calculate_no_show_charge(session, mark.party).refund_amount_cents)
        }
        (from, _, _) => Err(SessionError::InvalidTransition {
            from,
            to: SessionStatus::Refunded,
        }),
    }
}
