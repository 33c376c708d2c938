//! CreateAvailableSlotHandler - A provider publishes one open slot.

use std::sync::Arc;

use crate::domain::foundation::{AuthorizationResult, CommandMetadata, ProviderId, Timestamp};
use crate::domain::policy::can_create_session;
use crate::domain::session::{NewSlot, Session, SessionError, SessionType};
use crate::ports::{EventPublisher, SessionRepository};

use super::common::{persist, publish};

#[derive(Debug, Clone)]
pub struct CreateAvailableSlotCommand {
    pub provider_id: ProviderId,
    pub session_type: SessionType,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub start: Timestamp,
    pub end: Timestamp,
    pub price_cents: i64,
}

pub struct CreateAvailableSlotHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CreateAvailableSlotHandler {
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
        cmd: CreateAvailableSlotCommand,
        metadata: CommandMetadata,
    ) -> Result<Session, SessionError> {
        let actor = &metadata.actor;
        AuthorizationResult::decide(
            can_create_session(&cmd.provider_id, actor),
            actor,
            "create",
            "Session",
            cmd.provider_id.as_str(),
        )
        .into_result()?;

        let (mut session, event) = Session::new_available(
            NewSlot {
                provider_id: cmd.provider_id,
                service_type_id: None,
                availability_id: None,
                session_type: cmd.session_type,
                subject: cmd.subject,
                grade_level: cmd.grade_level,
                start: cmd.start,
                end: cmd.end,
                price_cents: cmd.price_cents,
            },
            Timestamp::now(),
        )?;

        persist(self.repository.as_ref(), &mut session).await?;
        publish(self.event_publisher.as_ref(), &event, &metadata).await;

        tracing::info!(
            session_id = %session.id(),
            provider_id = %session.provider_id(),
            starts_at = %session.scheduled_start(),
            "Slot published"
        );
        Ok(session)
    }
}
