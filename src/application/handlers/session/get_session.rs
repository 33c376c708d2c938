//! GetSessionHandler - Query handler for one session.

use std::sync::Arc;

use crate::domain::foundation::{authorize, Actor, SessionId};
use crate::domain::policy::can_view_session;
use crate::domain::session::{Session, SessionError};
use crate::ports::SessionRepository;

use super::common::load;

#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
    pub actor: Actor,
}

pub struct GetSessionHandler {
    repository: Arc<dyn SessionRepository>,
}

impl GetSessionHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<Session, SessionError> {
        let session = load(self.repository.as_ref(), query.session_id).await?;
        authorize(can_view_session(&session, &query.actor), &query.actor, "view", &session)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::session::fixtures::{open_slot_at, scheduled_session_at};

    #[tokio::test]
    async fn parties_and_admin_can_view_booked_session() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(24))).await;
        let handler = GetSessionHandler::new(h.repository.clone());

        for actor in [student(), tutor(), admin()] {
            let found = handler
                .handle(GetSessionQuery {
                    session_id: session.id(),
                    actor,
                })
                .await
                .unwrap();
            assert_eq!(found.id(), session.id());
        }
    }

    #[tokio::test]
    async fn strangers_cannot_view_booked_session() {
        let h = Harness::new();
        let session = h.seed(scheduled_session_at(hours_from_now(24))).await;
        let handler = GetSessionHandler::new(h.repository.clone());

        for actor in [other_student(), other_tutor()] {
            let result = handler
                .handle(GetSessionQuery {
                    session_id: session.id(),
                    actor,
                })
                .await;
            assert!(matches!(result, Err(SessionError::Forbidden(_))));
        }
    }

    #[tokio::test]
    async fn any_student_can_view_open_slot() {
        let h = Harness::new();
        let slot = h.seed(open_slot_at(hours_from_now(24))).await;
        let handler = GetSessionHandler::new(h.repository.clone());

        assert!(handler
            .handle(GetSessionQuery {
                session_id: slot.id(),
                actor: other_student(),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let h = Harness::new();
        let handler = GetSessionHandler::new(h.repository.clone());

        let result = handler
            .handle(GetSessionQuery {
                session_id: SessionId::new(),
                actor: admin(),
            })
            .await;

        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }
}
