//! PublishAvailabilityHandler - Cuts an availability window into open slots.

use std::sync::Arc;

use crate::domain::foundation::{authorize, CommandMetadata, Timestamp};
use crate::domain::offering::{Availability, ServiceType};
use crate::domain::policy::can_create_availability;
use crate::domain::session::{Session, SessionError};
use crate::ports::{EventPublisher, SessionRepository};

use super::common::{persist, publish};

#[derive(Debug, Clone)]
pub struct PublishAvailabilityCommand {
    pub service_type: ServiceType,
    pub availability: Availability,
}

pub struct PublishAvailabilityHandler {
    repository: Arc<dyn SessionRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl PublishAvailabilityHandler {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    /// Returns the created slots in chronological order.
    pub async fn handle(
        &self,
        cmd: PublishAvailabilityCommand,
        metadata: CommandMetadata,
    ) -> Result<Vec<Session>, SessionError> {
        let actor = &metadata.actor;
        authorize(
            can_create_availability(&cmd.availability.provider_id, actor),
            actor,
            "publish",
            &cmd.availability,
        )?;

        let now = Timestamp::now();
        let mut created = Vec::new();
        for slot in cmd.availability.slots(&cmd.service_type)? {
            let (mut session, event) = Session::new_available(slot, now)?;
            persist(self.repository.as_ref(), &mut session).await?;
            publish(self.event_publisher.as_ref(), &event, &metadata).await;
            created.push(session);
        }

        tracing::info!(
            availability_id = %cmd.availability.id,
            slots = created.len(),
            "Availability published"
        );
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::*;
    use crate::domain::foundation::ProviderId;
    use crate::domain::session::SessionType;

    fn offering(provider: &str) -> PublishAvailabilityCommand {
        let provider = ProviderId::new(provider).unwrap();
        let service =
            ServiceType::new(provider.clone(), "SAT Math", SessionType::TestPrep, 50, 9000)
                .unwrap();
        let start = hours_from_now(96);
        let availability =
            Availability::new(provider, service.id, start, start.plus_minutes(180)).unwrap();
        PublishAvailabilityCommand {
            service_type: service,
            availability,
        }
    }

    #[tokio::test]
    async fn window_becomes_back_to_back_slots() {
        let h = Harness::new();
        let handler = PublishAvailabilityHandler::new(h.repository.clone(), h.events.clone());

        let slots = handler
            .handle(offering("tutor-math-1"), metadata(tutor()))
            .await
            .unwrap();

        // 180 minutes of 50-minute sessions: three fit, 30 minutes left over.
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].scheduled_end(), slots[1].scheduled_start());
        assert!(slots.iter().all(|s| s.price_cents() == 9000));
        assert_eq!(h.events.events_of_type("session.slot_published.v1").len(), 3);
    }

    #[tokio::test]
    async fn other_providers_are_forbidden() {
        let h = Harness::new();
        let handler = PublishAvailabilityHandler::new(h.repository.clone(), h.events.clone());

        let result = handler
            .handle(offering("tutor-math-1"), metadata(other_tutor()))
            .await;

        assert!(matches!(result, Err(SessionError::Forbidden(_))));
        assert_eq!(h.repository.len().await, 0);
    }
}
