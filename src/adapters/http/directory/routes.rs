//! Axum routes for the provider directory.

use axum::{routing::post, Router};

use super::super::state::AppState;
use super::handlers::search_providers;

/// Directory routes, mounted at `/api/providers`.
///
/// # Routes
/// - `POST /search` - Match wizard answers against the directory
pub fn directory_routes() -> Router<AppState> {
    Router::new().route("/search", post(search_providers))
}
