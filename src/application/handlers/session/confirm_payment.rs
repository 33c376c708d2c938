//! ConfirmPaymentHandler - Payment verified, session scheduled, meeting attempted.
//!
//! The payment check is fatal: an unpaid or unreachable payment collaborator
//! leaves the session untouched. The meeting step is not: the session stays
//! scheduled and the caller receives a warning instead of a join link.

use std::sync::Arc;

use crate::domain::foundation::{authorize, CommandMetadata, SessionId, Timestamp};
use crate::domain::policy::can_cancel_session;
use crate::domain::session::{Session, SessionError};
use crate::ports::{
    EventPublisher, PaymentProvider, PaymentStatus, SessionFilter, SessionRepository,
};

use super::common::{attach_meeting, load, persist, publish};
use super::meetings::MeetingScheduler;

#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    pub session_id: SessionId,
    /// Checkout session or payment intent id.
    pub payment_id: String,
}

#[derive(Debug, Clone)]
pub struct ConfirmPaymentResult {
    pub session: Session,
    pub meeting_warning: Option<String>,
}

pub struct ConfirmPaymentHandler {
    repository: Arc<dyn SessionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    meetings: Arc<MeetingScheduler>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ConfirmPaymentHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        meetings: Arc<MeetingScheduler>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            payment_provider,
            meetings,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmPaymentCommand,
        metadata: CommandMetadata,
    ) -> Result<ConfirmPaymentResult, SessionError> {
        let actor = &metadata.actor;
        let mut session = load(self.repository.as_ref(), cmd.session_id).await?;
        // The booking parties (or an admin) may confirm what they booked.
        authorize(can_cancel_session(&session, actor), actor, "confirm", &session)?;

        let payment_id = cmd.payment_id.trim();
        if payment_id.is_empty() {
            return Err(SessionError::validation("payment_id", "payment id is required"));
        }

        // One payment pays for one session; bundles go through checkout.
        let claimed = self
            .repository
            .filter(&SessionFilter::new().with_payment_reference(payment_id))
            .await?;
        if claimed.iter().any(|other| other.id() != session.id()) {
            tracing::warn!(session_id = %session.id(), payment_id, "Payment already applied elsewhere");
            return Err(SessionError::validation(
                "payment_id",
                "payment is already applied to another session",
            ));
        }

        let status = self
            .payment_provider
            .retrieve_payment_status(payment_id)
            .await
            .map_err(|e| {
                tracing::error!(session_id = %session.id(), error = %e, "Payment status lookup failed");
                SessionError::PaymentFailed(e.to_string())
            })?;
        if status != PaymentStatus::Paid {
            return Err(SessionError::PaymentNotConfirmed(format!(
                "payment {} has not been paid",
                payment_id
            )));
        }

        let price = session.price_cents();
        let event = session.confirm_payment(price, Some(payment_id.to_string()), Timestamp::now())?;
        persist(self.repository.as_ref(), &mut session).await?;
        publish(self.event_publisher.as_ref(), &event, &metadata).await;
        tracing::info!(session_id = %session.id(), "Payment confirmed");

        let meeting_warning = attach_meeting(
            &self.meetings,
            self.repository.as_ref(),
            self.event_publisher.as_ref(),
            &mut session,
            None,
            &metadata,
        )
        .await;

        Ok(ConfirmPaymentResult {
            session,
            meeting_warning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::meeting::MockMeetingProvider;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::application::handlers::test_support::*;
    use crate::domain::foundation::UserId;
    use crate::domain::session::fixtures::open_slot_at;
    use crate::domain::session::SessionStatus;
    use crate::ports::{MeetingError, PaymentError};
    use std::time::Duration;

    struct Setup {
        h: Harness,
        payments: Arc<MockPaymentProvider>,
        meetings: Arc<MockMeetingProvider>,
        handler: ConfirmPaymentHandler,
    }

    fn setup() -> Setup {
        let h = Harness::new();
        let payments = Arc::new(MockPaymentProvider::new());
        let meetings = Arc::new(MockMeetingProvider::new());
        let scheduler =
            MeetingScheduler::new(meetings.clone(), 2).with_retry_delay(Duration::ZERO);
        let handler = ConfirmPaymentHandler::new(
            h.repository.clone(),
            payments.clone(),
            Arc::new(scheduler),
            h.events.clone(),
        );
        Setup {
            h,
            payments,
            meetings,
            handler,
        }
    }

    async fn pending(h: &Harness) -> Session {
        let mut slot = open_slot_at(hours_from_now(72));
        let student = UserId::new("student-1").unwrap();
        slot.book(student.clone(), student, Timestamp::now()).unwrap();
        h.seed(slot).await
    }

    fn command(session: &Session) -> ConfirmPaymentCommand {
        ConfirmPaymentCommand {
            session_id: session.id(),
            payment_id: "cs_paid".into(),
        }
    }

    #[tokio::test]
    async fn paid_session_is_scheduled_with_meeting() {
        let s = setup();
        let session = pending(&s.h).await;

        let result = s
            .handler
            .handle(command(&session), metadata(student()))
            .await
            .unwrap();

        assert!(result.meeting_warning.is_none());
        let stored = s.h.stored(&session).await;
        assert_eq!(stored.status(), SessionStatus::Scheduled);
        assert_eq!(stored.amount_charged_cents(), 7500);
        assert_eq!(stored.payment_reference(), Some("cs_paid"));
        assert!(stored.meeting().is_some());
        assert!(s.h.events.has_event("session.confirmed.v1"));
        assert!(s.h.events.has_event("session.meeting_attached.v1"));
    }

    #[tokio::test]
    async fn unpaid_checkout_changes_nothing() {
        let s = setup();
        let session = pending(&s.h).await;
        s.payments
            .set_status("cs_paid", crate::ports::PaymentStatus::Unpaid);

        let result = s.handler.handle(command(&session), metadata(student())).await;

        assert!(matches!(result, Err(SessionError::PaymentNotConfirmed(_))));
        assert_eq!(s.h.stored(&session).await.status(), SessionStatus::Pending);
        assert_eq!(s.meetings.call_count(), 0);
    }

    #[tokio::test]
    async fn payment_collaborator_error_is_fatal() {
        let s = setup();
        let session = pending(&s.h).await;
        s.payments.set_method_error(
            "retrieve_payment_status",
            PaymentError::network("connection reset"),
        );

        let result = s.handler.handle(command(&session), metadata(student())).await;

        assert!(matches!(result, Err(SessionError::PaymentFailed(_))));
        assert_eq!(s.h.stored(&session).await.status(), SessionStatus::Pending);
    }

    #[tokio::test]
    async fn meeting_failure_is_a_soft_warning() {
        let s = setup();
        let session = pending(&s.h).await;
        s.meetings.push_failure(MeetingError::Unavailable("timeout".into()));
        s.meetings.push_failure(MeetingError::Unavailable("timeout".into()));

        let result = s
            .handler
            .handle(command(&session), metadata(student()))
            .await
            .unwrap();

        assert!(result.meeting_warning.is_some());
        assert_eq!(s.meetings.call_count(), 2);
        let stored = s.h.stored(&session).await;
        assert_eq!(stored.status(), SessionStatus::Scheduled);
        assert!(stored.meeting().is_none());
    }

    #[tokio::test]
    async fn meeting_link_save_failure_keeps_the_confirmation() {
        let s = setup();
        let session = pending(&s.h).await;
        let repository = Arc::new(FailingWrites::new(s.h.repository.clone()));
        // Write 1 confirms, write 2 stores the meeting link.
        repository.fail_write(2);
        let handler = ConfirmPaymentHandler::new(
            repository,
            s.payments.clone(),
            Arc::new(MeetingScheduler::new(s.meetings.clone(), 1)),
            s.h.events.clone(),
        );

        let result = handler
            .handle(command(&session), metadata(student()))
            .await
            .unwrap();

        assert!(result.meeting_warning.unwrap().contains("disk full"));
        assert!(result.session.meeting().is_none());
        let stored = s.h.stored(&session).await;
        assert_eq!(stored.status(), SessionStatus::Scheduled);
        assert!(stored.meeting().is_none());
        assert_eq!(stored.version(), result.session.version());
        assert!(!s.h.events.has_event("session.meeting_attached.v1"));
    }

    #[tokio::test]
    async fn one_payment_cannot_confirm_two_sessions() {
        let s = setup();
        let first = pending(&s.h).await;
        let second = pending(&s.h).await;
        s.handler
            .handle(command(&first), metadata(student()))
            .await
            .unwrap();

        let result = s.handler.handle(command(&second), metadata(student())).await;

        assert!(matches!(
            result,
            Err(SessionError::ValidationFailed { ref field, .. }) if field == "payment_id"
        ));
        assert_eq!(s.h.stored(&second).await.status(), SessionStatus::Pending);
        assert_eq!(s.payments.call_count("retrieve_payment_status"), 1);
    }

    #[tokio::test]
    async fn strangers_cannot_confirm() {
        let s = setup();
        let session = pending(&s.h).await;

        let result = s
            .handler
            .handle(command(&session), metadata(other_student()))
            .await;

        assert!(matches!(result, Err(SessionError::Forbidden(_))));
        assert!(!s.payments.was_called("retrieve_payment_status"));
    }
}
