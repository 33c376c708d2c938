//! Load/persist/publish steps every session handler repeats.

use crate::domain::foundation::{CommandMetadata, SerializableDomainEvent, SessionId};
use crate::domain::session::{Session, SessionError, SessionEvent};
use crate::ports::{EventPublisher, SessionRepository};

use super::meetings::{MeetingOutcome, MeetingScheduler};

pub(crate) async fn load(
    repository: &dyn SessionRepository,
    id: SessionId,
) -> Result<Session, SessionError> {
    repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| SessionError::not_found(id))
}

/// Writes the session and adopts the stored version.
pub(crate) async fn persist(
    repository: &dyn SessionRepository,
    session: &mut Session,
) -> Result<(), SessionError> {
    let version = repository.upsert(session).await?;
    session.set_version(version);
    Ok(())
}

/// Publishes after the write has committed. A failed publish is logged, not
/// returned: the state change already happened.
pub(crate) async fn publish(
    publisher: &dyn EventPublisher,
    event: &SessionEvent,
    metadata: &CommandMetadata,
) {
    let envelope = match event.to_envelope() {
        Ok(envelope) => envelope
            .with_correlation_id(metadata.correlation_id())
            .with_user_id(metadata.actor.user_id.to_string()),
        Err(e) => {
            tracing::error!(session_id = %event.session_id(), error = %e, "Event serialization failed");
            return;
        }
    };

    if let Err(e) = publisher.publish(envelope).await {
        tracing::warn!(
            session_id = %event.session_id(),
            error = %e,
            "Event publication failed"
        );
    }
}

fn meeting_topic(session: &Session) -> String {
    match session.subject() {
        Some(subject) => format!("{} session: {}", session.session_type(), subject),
        None => format!("{} session", session.session_type()),
    }
}

/// Requests a meeting for a confirmed session and stores the link.
///
/// Never fails the caller. A missing link or a failed save comes back as a
/// warning, and `session` is left as it was last stored.
pub(crate) async fn attach_meeting(
    meetings: &MeetingScheduler,
    repository: &dyn SessionRepository,
    publisher: &dyn EventPublisher,
    session: &mut Session,
    host_email: Option<String>,
    metadata: &CommandMetadata,
) -> Option<String> {
    let stored = session.clone();
    let topic = meeting_topic(session);
    match meetings.attach(session, topic, host_email).await {
        MeetingOutcome::Attached(event) => match persist(repository, session).await {
            Ok(()) => {
                publish(publisher, &event, metadata).await;
                None
            }
            Err(e) => {
                tracing::error!(
                    session_id = %session.id(),
                    error = %e,
                    "Meeting link could not be saved"
                );
                *session = stored;
                Some(format!(
                    "Session confirmed, but the meeting link could not be saved: {}",
                    e
                ))
            }
        },
        MeetingOutcome::Skipped(warning) => Some(warning),
    }
}
