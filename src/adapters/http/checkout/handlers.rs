//! HTTP handlers for checkout and the payment webhook.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::{
    CompleteCheckoutCommand, StartCheckoutCommand, WebhookOutcome,
};
use crate::domain::foundation::{DomainError, Role, UserId};

use super::super::error::ApiError;
use super::super::metadata::command_metadata;
use super::super::middleware::RequireAuth;
use super::super::session::SessionResponse;
use super::super::state::AppState;
use super::dto::{
    BookingSummary, CompleteCheckoutRequest, CompleteCheckoutResponse, StartCheckoutRequest,
    StartCheckoutResponse, WebhookResponse,
};

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

fn parse_user_id(raw: Option<String>) -> Result<Option<UserId>, DomainError> {
    raw.map(UserId::new)
        .transpose()
        .map_err(DomainError::from)
}

/// POST /api/checkout - Validate the wizard and open a payment page
pub async fn start_checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Json(request): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let customer_email = request
        .customer_email
        .or_else(|| (!user.email.is_empty()).then(|| user.email.clone()));
    let cmd = StartCheckoutCommand {
        selection: request.selection,
        customer_email,
        on_behalf_of: parse_user_id(request.student_id)?,
    };

    let result = state
        .start_checkout_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(StartCheckoutResponse {
            checkout_session_id: result.checkout.id,
            checkout_url: result.checkout.url,
            expires_at: result.checkout.expires_at,
            session_reference: result.session_reference,
            booking: BookingSummary::from(&result.booking),
        }),
    ))
}

/// POST /api/checkout/complete - Create sessions for a paid checkout
///
/// Safe to call more than once; the webhook may already have done the work.
pub async fn complete_checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Json(request): Json<CompleteCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let student_id = match parse_user_id(request.student_id)? {
        Some(id) => id,
        None if user.role == Role::Student => user.id.clone(),
        None => return Err(DomainError::validation("student_id", "student_id is required").into()),
    };
    let cmd = CompleteCheckoutCommand {
        checkout_session_id: request.checkout_session_id,
        selection: request.selection,
        student_id,
        amount_paid_cents: None,
    };

    let result = state
        .complete_checkout_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    let status = if result.already_processed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(CompleteCheckoutResponse {
            sessions: result
                .sessions
                .iter()
                .map(|s| SessionResponse::for_viewer(s, user.role))
                .collect(),
            warnings: result.warnings,
            already_processed: result.already_processed,
        }),
    ))
}

/// POST /api/webhooks/payment - Payment collaborator callbacks
///
/// Unauthenticated; the signature header is the credential.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            DomainError::validation(SIGNATURE_HEADER, "Missing Stripe-Signature header")
        })?;

    let outcome = state.webhook_handler().handle(&body, signature).await?;

    let response = match outcome {
        WebhookOutcome::Completed(result) => WebhookResponse {
            received: true,
            sessions_created: Some(if result.already_processed {
                0
            } else {
                result.sessions.len()
            }),
            ignored: None,
        },
        WebhookOutcome::Ignored(reason) => WebhookResponse {
            received: true,
            sessions_created: None,
            ignored: Some(reason),
        },
    };
    Ok(Json(response))
}
