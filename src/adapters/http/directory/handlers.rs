//! HTTP handler for the provider search step of the booking wizard.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::domain::matching::MatchQuery;

use super::super::state::AppState;
use super::dto::{PlanResponse, ProviderResponse, ProviderSearchResponse};

/// POST /api/providers/search - Providers qualifying for the wizard answers
///
/// Open to anonymous visitors; browsing happens before sign-in.
pub async fn search_providers(
    State(state): State<AppState>,
    Json(query): Json<MatchQuery>,
) -> impl IntoResponse {
    let result = state.find_providers_handler().handle(&query);
    tracing::debug!(
        service = ?query.service,
        matched = result.providers.len(),
        used_fallback = result.used_fallback,
        "Provider search"
    );

    Json(ProviderSearchResponse {
        providers: result.providers.iter().map(ProviderResponse::from).collect(),
        used_fallback: result.used_fallback,
        plans: result.plans.iter().map(PlanResponse::from).collect(),
    })
}
