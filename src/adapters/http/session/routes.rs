//! Axum routes for the session lifecycle.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{
    book_session, cancel_session, complete_session, confirm_payment, create_slot, get_session,
    list_sessions, mark_no_show, process_refund, publish_availability,
};

/// Session routes, mounted at `/api/sessions`.
///
/// # Routes
/// - `GET /` - Sessions visible to the caller (`?status=a,b&starts_after=..`)
/// - `POST /` - Publish one open slot
/// - `GET /:id` - One session
/// - `POST /:id/book` - Claim an open slot
/// - `POST /:id/confirm-payment` - Confirm payment and schedule
/// - `POST /:id/complete` - Mark as held
/// - `POST /:id/cancel` - Cancel and quote the refund
/// - `POST /:id/no-show` - Record a missed session
/// - `POST /:id/refund` - Issue the quoted refund (admin)
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions).post(create_slot))
        .route("/:id", get(get_session))
        .route("/:id/book", post(book_session))
        .route("/:id/confirm-payment", post(confirm_payment))
        .route("/:id/complete", post(complete_session))
        .route("/:id/cancel", post(cancel_session))
        .route("/:id/no-show", post(mark_no_show))
        .route("/:id/refund", post(process_refund))
}

/// Availability routes, mounted at `/api/availability`.
pub fn availability_routes() -> Router<AppState> {
    Router::new().route("/", post(publish_availability))
}
