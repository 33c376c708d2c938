//! Axum routes for checkout and payment webhooks.

use axum::{routing::post, Router};

use super::super::state::AppState;
use super::handlers::{complete_checkout, payment_webhook, start_checkout};

/// Checkout routes, mounted at `/api/checkout`.
///
/// # Routes
/// - `POST /` - Validate the wizard answers and open a payment page
/// - `POST /complete` - Turn a paid checkout into sessions
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(start_checkout))
        .route("/complete", post(complete_checkout))
}

/// Webhook routes, mounted at `/api/webhooks`. No user authentication;
/// requests are verified by signature.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/payment", post(payment_webhook))
}
