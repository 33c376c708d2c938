//! HTTP adapter for checkout and payment webhooks.

mod dto;
mod handlers;
mod routes;

pub use dto::{StartCheckoutRequest, StartCheckoutResponse};
pub use handlers::SIGNATURE_HEADER;
pub use routes::{checkout_routes, webhook_routes};
