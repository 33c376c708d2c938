//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Bearer token validation (JWT, mock)
//! - `events` - Event publication (in-memory bus, tracing log)
//! - `http` - Axum HTTP surface
//! - `meeting` - Video meeting creation (Zoom-style HTTP API, mock)
//! - `storage` - Session records (in-memory, JSON file)
//! - `stripe` - Payments (Stripe, mock)

pub mod auth;
pub mod events;
pub mod http;
pub mod meeting;
pub mod storage;
pub mod stripe;

pub use auth::{JwtConfig, JwtSessionValidator, MockSessionValidator};
pub use events::{InMemoryEventBus, TracingEventPublisher};
pub use meeting::{HttpMeetingConfig, HttpMeetingProvider, MockMeetingProvider};
pub use storage::{InMemorySessionRepository, JsonFileSessionRepository};
pub use stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
