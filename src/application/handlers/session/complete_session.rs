//! CompleteSessionHandler - The provider marks a held session as completed.

use std::sync::Arc;

use crate::domain::foundation::{authorize, CommandMetadata, SessionId, Timestamp};
use crate::domain::policy::can_complete_session;
use crate::domain::session::{Session, SessionError};
use crate::ports::{EventPublisher, SessionRepository};

use super::common::{load, persist, publish};

#[derive(Debug, Clone)]
pub struct CompleteSessionCommand {
    pub session_id: SessionId,
}

pub struct CompleteSessionHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CompleteSessionHandler {
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
        cmd: CompleteSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<Session, SessionError> {
        let actor = &metadata.actor;
        let mut session = load(self.repository.as_ref(), cmd.session_id).await?;
        authorize(can_complete_session(&session, actor), actor, "complete", &session)?;

        let event = session.complete(Timestamp::now())?;
        persist(self.repository.as_ref(), &mut session).await?;
        publish(self.event_publisher.as_ref(), &event, &metadata).await;

        tracing::info!(session_id = %session.id(), "Session completed");
        Ok(session)
    }
}
