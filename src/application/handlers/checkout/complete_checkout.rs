//! CompleteCheckoutHandler - A paid checkout becomes scheduled sessions.
//!
//! One `scheduled` session is synthesized per booked slot. Completion is
//! idempotent on the checkout id: once every slot has a session carrying it
//! as payment reference, those sessions are returned untouched. A completion
//! interrupted part way is resumed by the next attempt, which creates only
//! the missing slots. Meeting failures are collected as warnings.

use std::sync::Arc;

use crate::application::handlers::session::common::{attach_meeting, persist, publish};
use crate::application::handlers::session::MeetingScheduler;
use crate::domain::booking::{BookingContext, BookingDraft, BookingSelection, FinalizedBooking, PlanCatalog};
use crate::domain::directory::ProviderDirectory;
use crate::domain::foundation::{
    AuthorizationResult, CommandMetadata, DomainError, ErrorCode, Timestamp, UserId,
};
use crate::domain::session::{CheckoutBooking, Session, SessionType};
use crate::ports::{EventPublisher, PaymentProvider, PaymentStatus, SessionFilter, SessionRepository};

#[derive(Debug, Clone)]
pub struct CompleteCheckoutCommand {
    pub checkout_session_id: String,
    pub selection: BookingSelection,
    pub student_id: UserId,
    /// Amount the payment collaborator reports as collected, when known.
    pub amount_paid_cents: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CompleteCheckoutResult {
    /// Chronological.
    pub sessions: Vec<Session>,
    pub warnings: Vec<String>,
    /// True when an earlier completion already created the sessions.
    pub already_processed: bool,
}

pub struct CompleteCheckoutHandler {
    repository: Arc<dyn SessionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    meetings: Arc<MeetingScheduler>,
    event_publisher: Arc<dyn EventPublisher>,
    directory: Arc<ProviderDirectory>,
    plans: Arc<PlanCatalog>,
}

impl CompleteCheckoutHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        meetings: Arc<MeetingScheduler>,
        event_publisher: Arc<dyn EventPublisher>,
        directory: Arc<ProviderDirectory>,
        plans: Arc<PlanCatalog>,
    ) -> Self {
        Self {
            repository,
            payment_provider,
            meetings,
            event_publisher,
            directory,
            plans,
        }
    }

    pub async fn handle(
        &self,
        cmd: CompleteCheckoutCommand,
        metadata: CommandMetadata,
    ) -> Result<CompleteCheckoutResult, DomainError> {
        let actor = &metadata.actor;
        AuthorizationResult::decide(
            actor.is_admin() || actor.user_id == cmd.student_id,
            actor,
            "complete",
            "Checkout",
            cmd.checkout_session_id.as_str(),
        )
        .into_result()?;

        let checkout_id = cmd.checkout_session_id.trim();
        if checkout_id.is_empty() {
            return Err(DomainError::validation(
                "checkout_session_id",
                "checkout session id is required",
            ));
        }

        let ctx = BookingContext::new(&self.directory, &self.plans);
        let booking = BookingDraft::replay(&cmd.selection, ctx)?;

        let existing = self
            .repository
            .filter(&SessionFilter::new().with_payment_reference(checkout_id))
            .await?;
        if existing.len() >= booking.slots.len() {
            tracing::info!(checkout_id, count = existing.len(), "Checkout already completed");
            return Ok(CompleteCheckoutResult {
                sessions: existing,
                warnings: Vec::new(),
                already_processed: true,
            });
        }

        let status = self
            .payment_provider
            .retrieve_payment_status(checkout_id)
            .await
            .map_err(|e| {
                tracing::error!(checkout_id, error = %e, "Payment status lookup failed");
                DomainError::from(e)
            })?;
        if status != PaymentStatus::Paid {
            return Err(DomainError::new(
                ErrorCode::PaymentRequired,
                format!("checkout {} has not been paid", checkout_id),
            ));
        }

        if let Some(paid) = cmd.amount_paid_cents {
            if paid != booking.price_cents() {
                return Err(DomainError::validation(
                    "amount_paid_cents",
                    format!(
                        "collected {} cents but the booking costs {}",
                        paid,
                        booking.price_cents()
                    ),
                ));
            }
        }

        // An interrupted completion left some slots stored; only the rest are created.
        if !existing.is_empty() {
            tracing::warn!(
                checkout_id,
                stored = existing.len(),
                booked = booking.slots.len(),
                "Resuming partially completed checkout"
            );
        }

        let now = Timestamp::now();
        let mut sessions = existing;
        let mut warnings = Vec::new();
        for (slot, price) in booking.slots.iter().zip(booking.plan.per_session_prices()) {
            if sessions.iter().any(|s| s.scheduled_start() == slot.start()) {
                continue;
            }
            let (mut session, event) = Session::from_checkout(
                CheckoutBooking {
                    student_id: cmd.student_id.clone(),
                    provider_id: booking.provider_id.clone(),
                    session_type: SessionType::from(booking.service),
                    subject: session_subject(&booking),
                    start: slot.start(),
                    end: slot.end(booking.plan.duration_minutes),
                    price_cents: price,
                    amount_charged_cents: price,
                    payment_reference: checkout_id.to_string(),
                },
                now,
            )?;
            persist(self.repository.as_ref(), &mut session).await?;
            publish(self.event_publisher.as_ref(), &event, &metadata).await;

            if let Some(warning) = attach_meeting(
                &self.meetings,
                self.repository.as_ref(),
                self.event_publisher.as_ref(),
                &mut session,
                booking.provider_email.clone(),
                &metadata,
            )
            .await
            {
                warnings.push(warning);
            }
            sessions.push(session);
        }
        sessions.sort_by_key(|s| s.scheduled_start());

        tracing::info!(
            checkout_id,
            student_id = %cmd.student_id,
            provider_id = %booking.provider_id,
            sessions = sessions.len(),
            meeting_warnings = warnings.len(),
            "Checkout completed"
        );

        Ok(CompleteCheckoutResult {
            sessions,
            warnings,
            already_processed: false,
        })
    }
}

/// "Subject: topic" for tutoring, the test or school otherwise.
fn session_subject(booking: &FinalizedBooking) -> Option<String> {
    match (booking.subject.as_deref(), booking.topic.as_deref()) {
        (Some(subject), Some(topic)) => Some(format!("{}: {}", subject, topic)),
        (Some(subject), None) => Some(subject.to_string()),
        (None, _) => booking.school.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::meeting::MockMeetingProvider;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::application::handlers::test_support::*;
    use crate::domain::session::SessionStatus;
    use crate::ports::MeetingError;
    use std::time::Duration;

    struct Setup {
        h: Harness,
        payments: Arc<MockPaymentProvider>,
        meetings: Arc<MockMeetingProvider>,
        handler: CompleteCheckoutHandler,
    }

    fn setup() -> Setup {
        let h = Harness::new();
        let payments = Arc::new(MockPaymentProvider::new());
        let meetings = Arc::new(MockMeetingProvider::new());
        let scheduler =
            Arc::new(MeetingScheduler::new(meetings.clone(), 2).with_retry_delay(Duration::ZERO));
        let handler = CompleteCheckoutHandler::new(
            h.repository.clone(),
            payments.clone(),
            scheduler,
            h.events.clone(),
            Arc::new(ProviderDirectory::seed()),
            Arc::new(PlanCatalog::standard()),
        );
        Setup {
            h,
            payments,
            meetings,
            handler,
        }
    }

    fn handler_over(s: &Setup, repository: Arc<dyn SessionRepository>) -> CompleteCheckoutHandler {
        CompleteCheckoutHandler::new(
            repository,
            s.payments.clone(),
            Arc::new(MeetingScheduler::new(s.meetings.clone(), 1)),
            s.h.events.clone(),
            Arc::new(ProviderDirectory::seed()),
            Arc::new(PlanCatalog::standard()),
        )
    }

    fn command() -> CompleteCheckoutCommand {
        CompleteCheckoutCommand {
            checkout_session_id: "cs_paid_1".into(),
            selection: japanese_selection(),
            student_id: UserId::new("student-1").unwrap(),
            amount_paid_cents: Some(26_000),
        }
    }

    #[tokio::test]
    async fn creates_one_scheduled_session_per_slot() {
        let s = setup();

        let result = s.handler.handle(command(), metadata(student())).await.unwrap();

        assert!(!result.already_processed);
        assert!(result.warnings.is_empty());
        assert_eq!(result.sessions.len(), 4);
        assert!(result
            .sessions
            .iter()
            .all(|session| session.status() == SessionStatus::Scheduled
                && session.provider_id() == "tutor-languages-2"
                && session.payment_reference() == Some("cs_paid_1")
                && session.meeting().is_some()));
        assert_eq!(result.sessions[0].scheduled_start(), slot(1, 10).start());
        assert_eq!(result.sessions[0].subject(), Some("Foreign Languages: Japanese"));

        let total: i64 = result.sessions.iter().map(|s| s.price_cents()).sum();
        assert_eq!(total, 26_000);
        assert_eq!(s.h.events.events_of_type("session.confirmed.v1").len(), 4);
        assert_eq!(
            s.meetings.requests()[0].host_email.as_deref(),
            Some("aiko.tanaka@tutorhub.example")
        );
    }

    #[tokio::test]
    async fn second_completion_returns_existing_sessions() {
        let s = setup();
        s.handler.handle(command(), metadata(student())).await.unwrap();

        let again = s.handler.handle(command(), metadata(student())).await.unwrap();

        assert!(again.already_processed);
        assert_eq!(again.sessions.len(), 4);
        assert_eq!(s.h.repository.list().await.unwrap().len(), 4);
        assert_eq!(s.payments.call_count("retrieve_payment_status"), 1);
    }

    #[tokio::test]
    async fn interrupted_completion_is_resumed_on_retry() {
        let s = setup();
        let repository = Arc::new(FailingWrites::new(s.h.repository.clone()));
        // The first session takes writes 1 and 2 (session, meeting link).
        repository.fail_write(3);
        let handler = handler_over(&s, repository);

        let first = handler.handle(command(), metadata(student())).await;
        assert!(first.is_err());
        assert_eq!(s.h.repository.list().await.unwrap().len(), 1);

        let retry = handler.handle(command(), metadata(student())).await.unwrap();

        assert!(!retry.already_processed);
        let starts: Vec<_> = retry.sessions.iter().map(|s| s.scheduled_start()).collect();
        assert_eq!(
            starts,
            vec![
                slot(1, 10).start(),
                slot(3, 10).start(),
                slot(6, 10).start(),
                slot(8, 10).start()
            ]
        );
        let stored = s.h.repository.list().await.unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored.iter().map(|s| s.price_cents()).sum::<i64>(), 26_000);

        let again = handler.handle(command(), metadata(student())).await.unwrap();
        assert!(again.already_processed);
        assert_eq!(again.sessions.len(), 4);
    }

    #[tokio::test]
    async fn meeting_link_save_failure_does_not_abort_the_bundle() {
        let s = setup();
        let repository = Arc::new(FailingWrites::new(s.h.repository.clone()));
        repository.fail_write(2);
        let handler = handler_over(&s, repository);

        let result = handler.handle(command(), metadata(student())).await.unwrap();

        assert_eq!(result.sessions.len(), 4);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.sessions[0].meeting().is_none());
        let stored = s.h.repository.list().await.unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored.iter().filter(|s| s.meeting().is_some()).count(), 3);
    }

    #[tokio::test]
    async fn unpaid_checkout_creates_nothing() {
        let s = setup();
        s.payments.set_status("cs_paid_1", PaymentStatus::Unpaid);

        let err = s.handler.handle(command(), metadata(student())).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::PaymentRequired);
        assert!(s.h.repository.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn amount_mismatch_is_rejected() {
        let s = setup();
        let mut cmd = command();
        cmd.amount_paid_cents = Some(7_500);

        let err = s.handler.handle(cmd, metadata(student())).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(s.h.repository.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn meeting_failures_are_warnings() {
        let s = setup();
        for _ in 0..2 {
            s.meetings.push_failure(MeetingError::Unavailable("503".into()));
        }

        let result = s.handler.handle(command(), metadata(student())).await.unwrap();

        assert_eq!(result.sessions.len(), 4);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.sessions[0].meeting().is_none());
        assert!(result.sessions[1].meeting().is_some());
    }

    #[tokio::test]
    async fn other_students_cannot_complete() {
        let s = setup();

        let err = s
            .handler
            .handle(command(), metadata(other_student()))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
