//! Application router: every endpoint family behind shared layers.

use std::time::Duration;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::checkout::{checkout_routes, webhook_routes};
use super::directory::directory_routes;
use super::middleware::auth_middleware;
use super::session::{availability_routes, session_routes};
use super::state::AppState;

/// Cross-cutting HTTP settings.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Allowed browser origins. Empty allows no cross-origin calls.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ServerConfig> for RouterSettings {
    fn from(server: &ServerConfig) -> Self {
        Self {
            cors_origins: server.cors_origins_list(),
            request_timeout: Duration::from_secs(server.request_timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Builds the full application.
///
/// # Routes
/// - `GET /health`
/// - `/api/providers` - see [`directory_routes`]
/// - `/api/checkout` - see [`checkout_routes`]
/// - `/api/sessions` - see [`session_routes`]
/// - `/api/availability` - see [`availability_routes`]
/// - `/api/webhooks` - see [`webhook_routes`]
pub fn app_router(state: AppState, settings: &RouterSettings) -> Router {
    let api = Router::new()
        .nest("/providers", directory_routes())
        .nest("/checkout", checkout_routes())
        .nest("/sessions", session_routes())
        .nest("/availability", availability_routes())
        .nest("/webhooks", webhook_routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(from_fn_with_state(
            state.session_validator.clone(),
            auth_middleware,
        ))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
        .fallback(|| async { StatusCode::NOT_FOUND })
        .with_state(state)
}
