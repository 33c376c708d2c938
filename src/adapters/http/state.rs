//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::application::handlers::{
    BookSessionHandler, CancelSessionHandler, CheckoutUrls, CompleteCheckoutHandler,
    CompleteSessionHandler, ConfirmPaymentHandler, CreateAvailableSlotHandler,
    FindProvidersHandler, GetSessionHandler, ListSessionsHandler, MarkNoShowHandler,
    MeetingScheduler, PaymentWebhookHandler, ProcessRefundHandler, PublishAvailabilityHandler,
    StartCheckoutHandler,
};
use crate::domain::booking::PlanCatalog;
use crate::domain::directory::ProviderDirectory;
use crate::ports::{EventPublisher, PaymentProvider, SessionRepository, SessionValidator};

/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn SessionRepository>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub meetings: Arc<MeetingScheduler>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub directory: Arc<ProviderDirectory>,
    pub plans: Arc<PlanCatalog>,
    pub checkout_urls: CheckoutUrls,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn create_slot_handler(&self) -> CreateAvailableSlotHandler {
        CreateAvailableSlotHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn publish_availability_handler(&self) -> PublishAvailabilityHandler {
        PublishAvailabilityHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn book_handler(&self) -> BookSessionHandler {
        BookSessionHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn confirm_payment_handler(&self) -> ConfirmPaymentHandler {
        ConfirmPaymentHandler::new(
            self.repository.clone(),
            self.payment_provider.clone(),
            self.meetings.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn complete_handler(&self) -> CompleteSessionHandler {
        CompleteSessionHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn cancel_handler(&self) -> CancelSessionHandler {
        CancelSessionHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn no_show_handler(&self) -> MarkNoShowHandler {
        MarkNoShowHandler::new(self.repository.clone(), self.event_publisher.clone())
    }

    pub fn refund_handler(&self) -> ProcessRefundHandler {
        ProcessRefundHandler::new(
            self.repository.clone(),
            self.payment_provider.clone(),
            self.event_publisher.clone(),
        )
    }

    pub fn get_handler(&self) -> GetSessionHandler {
        GetSessionHandler::new(self.repository.clone())
    }

    pub fn list_handler(&self) -> ListSessionsHandler {
        ListSessionsHandler::new(self.repository.clone())
    }

    pub fn find_providers_handler(&self) -> FindProvidersHandler {
        FindProvidersHandler::new(self.directory.clone(), self.plans.clone())
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.payment_provider.clone(),
            self.directory.clone(),
            self.plans.clone(),
            self.checkout_urls.clone(),
        )
    }

    pub fn complete_checkout_handler(&self) -> CompleteCheckoutHandler {
        CompleteCheckoutHandler::new(
            self.repository.clone(),
            self.payment_provider.clone(),
            self.meetings.clone(),
            self.event_publisher.clone(),
            self.directory.clone(),
            self.plans.clone(),
        )
    }

    pub fn webhook_handler(&self) -> PaymentWebhookHandler {
        PaymentWebhookHandler::new(
            self.payment_provider.clone(),
            Arc::new(self.complete_checkout_handler()),
        )
    }
}
