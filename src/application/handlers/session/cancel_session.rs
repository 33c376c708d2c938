//! CancelSessionHandler - Cancels a scheduled session and quotes the refund.
//!
//! The quote is priced at the moment of cancellation. Issuing the refund is a
//! separate step (`ProcessRefundHandler`).

use std::sync::Arc;

use crate::domain::foundation::{authorize, CommandMetadata, SessionId, Timestamp};
use crate::domain::policy::{calculate_refund, can_cancel_session, RefundQuote};
use crate::domain::session::{Session, SessionError};
use crate::ports::{EventPublisher, SessionRepository};

use super::common::{load, persist, publish};

#[derive(Debug, Clone)]
pub struct CancelSessionCommand {
    pub session_id: SessionId,
    pub reason: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CancelSessionResult {
    pub session: Session,
    pub refund: RefundQuote,
}

pub struct CancelSessionHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CancelSessionHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<CancelSessionResult, SessionError> {
        let actor = &metadata.actor;
        let mut session = load(self.repository.as_ref(), cmd.session_id).await?;
        authorize(can_cancel_session(&session, actor), actor, "cancel", &session)?;

        let now = Timestamp::now();
        let event = session.cancel(actor, &cmd.reason, cmd.note, now)?;
        let refund = calculate_refund(&session, now);

        persist(self.repository.as_ref(), &mut session).await?;
        publish(self.event_publisher.as_ref(), &event, &metadata).await;

        tracing::info!(
            session_id = %session.id(),
            cancelled_by = %actor.user_id,
            refund_cents = refund.refund_amount_cents,
            full_charge = refund.is_full_charge,
            "Session cancelled"
        );
        Ok(CancelSessionResult { session, refund })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::session::fixtures::{open_slot_at, scheduled_session_at};
    use crate::domain::session::SessionStatus;

    fn handler(h: &Harness) -> CancelSessionHandler {
        CancelSessionHandler::new(h.repository.clone(), h.events.clone())
    }

    fn command(session: &Session) -> CancelSessionCommand {
        CancelSessionCommand {
            session_id: session.id(),
            reason: "schedule conflict".into(),
            note: None,
        }
    }

    #[tokio::test]
    async fn early_cancellation_quotes_full_refund() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(72))).await;

        let result = handler(&h)
            .handle(command(&session), metadata(student()))
            .await
            .unwrap();

        assert_eq!(result.session.status(), SessionStatus::Cancelled);
        assert_eq!(result.refund.refund_amount_cents, 7500);
        assert!(!result.refund.is_full_charge);
        let stored = h.stored(&session).await;
        assert_eq!(stored.cancellation().unwrap().reason, "schedule conflict");
        assert!(h.events.has_event("session.cancelled.v1"));
    }

    #[tokio::test]
    async fn late_cancellation_is_charged_in_full() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(3))).await;

        let result = handler(&h)
            .handle(command(&session), metadata(tutor()))
            .await
            .unwrap();

        assert_eq!(result.refund.refund_amount_cents, 0);
        assert!(result.refund.is_full_charge);
    }

    #[tokio::test]
    async fn blank_reason_is_rejected_without_change() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(72))).await;
        let mut cmd = command(&session);
        cmd.reason = "  ".into();

        let result = handler(&h).handle(cmd, metadata(student())).await;

        assert!(matches!(result, Err(SessionError::ValidationFailed { .. })));
        assert_eq!(h.stored(&session).await.status(), SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn non_party_is_forbidden() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(72))).await;

        let result = handler(&h)
            .handle(command(&session), metadata(other_tutor()))
            .await;

        assert!(matches!(result, Err(SessionError::Forbidden(_))));
    }

    #[tokio::test]
    async fn open_slot_cannot_be_cancelled() {
        let h = Harness::new();
        let slot = h.seed(open_slot_at(hours_from_now(72))).await;

        let result = handler(&h).handle(command(&slot), metadata(admin())).await;

        assert!(matches!(result, Err(SessionError::InvalidTransition { .. })));
    }
}
