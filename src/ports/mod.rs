//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SessionRepository` - Session record store with optimistic versioning
//! - `PaymentProvider` - Checkout, payment status, refunds, webhooks
//! - `MeetingProvider` - Video meeting creation (best effort)
//! - `SessionValidator` - Bearer token to current user and role
//! - `EventPublisher` - Domain event publication

mod event_publisher;
mod meeting_provider;
mod payment_provider;
mod session_repository;
mod session_validator;

pub use event_publisher::EventPublisher;
pub use meeting_provider::{MeetingError, MeetingProvider, MeetingRequest};
pub use payment_provider::{
    CheckoutRequest, CheckoutSession, PaymentError, PaymentErrorCode, PaymentIntent,
    PaymentProvider, PaymentStatus, PaymentWebhook, PaymentWebhookKind, Refund, RefundRequest,
};
pub use session_repository::{SessionFilter, SessionRepository};
pub use session_validator::SessionValidator;
