//! MarkNoShowHandler - Records who missed a session and prices it.

use std::sync::Arc;

use crate::domain::foundation::{authorize, CommandMetadata, SessionId, Timestamp};
use crate::domain::policy::{calculate_no_show_charge, can_mark_no_show, NoShowCharge};
use crate::domain::session::{NoShowParty, Session, SessionError};
use crate::ports::{EventPublisher, SessionRepository};

use super::common::{load, persist, publish};

#[derive(Debug, Clone)]
pub struct MarkNoShowCommand {
    pub session_id: SessionId,
    pub party: NoShowParty,
}

#[derive(Debug, Clone)]
pub struct MarkNoShowResult {
    pub session: Session,
    pub charge: NoShowCharge,
}

pub struct MarkNoShowHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl MarkNoShowHandler {
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
        cmd: MarkNoShowCommand,
        metadata: CommandMetadata,
    ) -> Result<MarkNoShowResult, SessionError> {
        let actor = &metadata.actor;
        let mut session = load(self.repository.as_ref(), cmd.session_id).await?;
        authorize(can_mark_no_show(&session, actor), actor, "mark_no_show", &session)?;

        let event = session.mark_no_show(cmd.party, actor, Timestamp::now())?;
        let charge = calculate_no_show_charge(&session, cmd.party);

        persist(self.repository.as_ref(), &mut session).await?;
        publish(self.event_publisher.as_ref(), &event, &metadata).await;

        tracing::info!(
            session_id = %session.id(),
            party = %cmd.party,
            refund_cents = charge.refund_amount_cents,
            "Session marked no-show"
        );
        Ok(MarkNoShowResult { session, charge })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::foundation::UserId;
    use crate::domain::session::fixtures::{open_slot_at, scheduled_session_at};
    use crate::domain::session::SessionStatus;

    fn handler(h: &Harness) -> MarkNoShowHandler {
        MarkNoShowHandler::new(h.repository.clone(), h.events.clone())
    }

    fn command(session: &Session, party: NoShowParty) -> MarkNoShowCommand {
        MarkNoShowCommand {
            session_id: session.id(),
            party,
        }
    }

    #[tokio::test]
    async fn student_no_show_is_charged() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(-1))).await;

        let result = handler(&h)
            .handle(command(&session, NoShowParty::Student), metadata(tutor()))
            .await
            .unwrap();

        assert_eq!(result.session.status(), SessionStatus::NoShow);
        assert_eq!(result.charge.student_charge_cents, 7500);
        assert_eq!(result.charge.refund_amount_cents, 0);
        assert!(h.events.has_event("session.no_show.v1"));
    }

    #[tokio::test]
    async fn provider_no_show_refunds_student() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(-1))).await;

        let result = handler(&h)
            .handle(command(&session, NoShowParty::Provider), metadata(student()))
            .await
            .unwrap();

        assert_eq!(result.charge.student_charge_cents, 0);
        assert_eq!(result.charge.refund_amount_cents, 7500);
    }

    #[tokio::test]
    async fn future_session_is_too_early() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(2))).await;

        let result = handler(&h)
            .handle(command(&session, NoShowParty::Student), metadata(tutor()))
            .await;

        assert!(matches!(result, Err(SessionError::NoShowTooEarly { .. })));
        assert_eq!(h.stored(&session).await.status(), SessionStatus::Scheduled);
    }

    #[tokio::test]
    async fn pending_session_is_rejected() {
        let h = Harness::new();
        let mut slot = open_slot_at(hours_from_now(-1));
        let student_id = UserId::new("student-1").unwrap();
        slot.book(student_id.clone(), student_id, Timestamp::now()).unwrap();
        let pending = h.seed(slot).await;

        let result = handler(&h)
            .handle(command(&pending, NoShowParty::Student), metadata(admin()))
            .await;

        assert!(matches!(result, Err(SessionError::InvalidTransition { .. })));
    }
}
