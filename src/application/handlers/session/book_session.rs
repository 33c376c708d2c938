//! BookSessionHandler - A student claims an open slot.

use std::sync::Arc;

use crate::domain::foundation::{authorize, CommandMetadata, SessionId, Timestamp, UserId};
use crate::domain::policy::can_book_session;
use crate::domain::session::{Session, SessionError};
use crate::ports::{EventPublisher, SessionRepository};

use super::common::{load, persist, publish};

#[derive(Debug, Clone)]
pub struct BookSessionCommand {
    pub session_id: SessionId,
    /// Set when an admin books on a student's behalf. Students always book
    /// for themselves.
    pub on_behalf_of: Option<UserId>,
}

pub struct BookSessionHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl BookSessionHandler {
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
        cmd: BookSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<Session, SessionError> {
        let actor = &metadata.actor;
        let mut session = load(self.repository.as_ref(), cmd.session_id).await?;
        authorize(can_book_session(&session, actor), actor, "book", &session)?;

        let student_id = match (actor.is_admin(), cmd.on_behalf_of) {
            (true, Some(student)) => student,
            (true, None) => {
                return Err(SessionError::validation(
                    "student_id",
                    "admins must name the student they book for",
                ))
            }
            (false, _) => actor.user_id.clone(),
        };

        let event = session.book(student_id, actor.user_id.clone(), Timestamp::now())?;
        persist(self.repository.as_ref(), &mut session).await?;
        publish(self.event_publisher.as_ref(), &event, &metadata).await;

        tracing::info!(session_id = %session.id(), booked_by = %actor.user_id, "Session booked");
        Ok(session)
    }
}
