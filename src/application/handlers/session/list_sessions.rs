//! ListSessionsHandler - Role-scoped session listing.
//!
//! Students see their own sessions, providers the sessions they teach, and
//! admins everything. A student asking for `available` sessions also gets
//! every open slot, since those belong to nobody yet.

use std::sync::Arc;

use crate::domain::foundation::{Actor, Role, Timestamp};
use crate::domain::session::{Session, SessionError, SessionStatus};
use crate::ports::{SessionFilter, SessionRepository};

#[derive(Debug, Clone)]
pub struct ListSessionsQuery {
    pub actor: Actor,
    /// Empty means every status.
    pub statuses: Vec<SessionStatus>,
    pub starts_after: Option<Timestamp>,
    pub starts_before: Option<Timestamp>,
}

impl ListSessionsQuery {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            statuses: Vec::new(),
            starts_after: None,
            starts_before: None,
        }
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = SessionStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }
}

pub struct ListSessionsHandler {
    repository: Arc<dyn SessionRepository>,
}

impl ListSessionsHandler {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// Chronological by scheduled start.
    pub async fn handle(&self, query: ListSessionsQuery) -> Result<Vec<Session>, SessionError> {
        let mut base = SessionFilter::new().starting_between(query.starts_after, query.starts_before);
        if !query.statuses.is_empty() {
            base = base.with_statuses(query.statuses.iter().copied());
        }

        let actor = &query.actor;
        let sessions = match actor.role {
            Role::Admin => self.repository.filter(&base).await?,
            Role::Provider => {
                self.repository
                    .filter(&base.for_provider(actor.user_id.as_str()))
                    .await?
            }
            Role::Student => {
                let mut own = self
                    .repository
                    .filter(&base.clone().for_student(actor.user_id.clone()))
                    .await?;
                if query.statuses.contains(&SessionStatus::Available) {
                    let open = self
                        .repository
                        .filter(&base.with_statuses([SessionStatus::Available]))
                        .await?;
                    own.extend(open);
                    own.sort_by_key(|s| (s.scheduled_start(), s.id()));
                    own.dedup_by_key(|s| s.id());
                }
                own
            }
        };

        tracing::debug!(
            user_id = %actor.user_id,
            role = %actor.role,
            count = sessions.len(),
            "Listed sessions"
        );
        Ok(sessions)
    }
}
