//! HTTP handlers for the session lifecycle endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::handlers::{
    BookSessionCommand, CancelSessionCommand, CompleteSessionCommand, ConfirmPaymentCommand,
    CreateAvailableSlotCommand, GetSessionQuery, ListSessionsQuery, MarkNoShowCommand,
    ProcessRefundCommand, PublishAvailabilityCommand,
};
use crate::domain::foundation::{AuthenticatedUser, ProviderId, Role, SessionId, UserId};
use crate::domain::offering::{Availability, ServiceType};
use crate::domain::session::{SessionError, SessionStatus};

use super::super::error::ApiError;
use super::super::metadata::command_metadata;
use super::super::middleware::RequireAuth;
use super::super::state::AppState;
use super::dto::{
    BookSessionRequest, CancelSessionRequest, CancelSessionResponse, ConfirmPaymentRequest,
    ConfirmPaymentResponse, CreateSlotRequest, ListSessionsParams, MarkNoShowRequest,
    MarkNoShowResponse, ProcessRefundResponse, PublishAvailabilityRequest, SessionListResponse,
    SessionResponse,
};

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid session ID"))
}

/// Providers act for themselves; anyone else has to name the provider.
fn acting_provider(
    user: &AuthenticatedUser,
    requested: Option<String>,
) -> Result<ProviderId, SessionError> {
    let raw = match requested {
        Some(id) => id,
        None if user.role == Role::Provider => user.id.to_string(),
        None => return Err(SessionError::validation("provider_id", "provider_id is required")),
    };
    Ok(ProviderId::new(raw)?)
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<SessionStatus>, SessionError> {
    raw.map(|list| {
        list.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<SessionStatus>)
            .collect::<Result<Vec<_>, _>>()
    })
    .transpose()
    .map(Option::unwrap_or_default)
    .map_err(SessionError::from)
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/sessions - Sessions visible to the caller
pub async fn list_sessions(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListSessionsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let statuses = parse_statuses(params.status.as_deref())?;
    let query = ListSessionsQuery {
        starts_after: params.starts_after,
        starts_before: params.starts_before,
        ..ListSessionsQuery::new(user.actor()).with_statuses(statuses)
    };

    let sessions = state.list_handler().handle(query).await?;

    Ok(Json(SessionListResponse {
        sessions: sessions
            .iter()
            .map(|s| SessionResponse::for_viewer(s, user.role))
            .collect(),
    }))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetSessionQuery {
        session_id: parse_session_id(&session_id)?,
        actor: user.actor(),
    };

    let session = state.get_handler().handle(query).await?;

    Ok(Json(SessionResponse::for_viewer(&session, user.role)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Publish one open slot
pub async fn create_slot(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Json(request): Json<CreateSlotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CreateAvailableSlotCommand {
        provider_id: acting_provider(&user, request.provider_id)?,
        session_type: request.session_type,
        subject: request.subject,
        grade_level: request.grade_level,
        start: request.start,
        end: request.end,
        price_cents: request.price_cents,
    };

    let session = state
        .create_slot_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::for_viewer(&session, user.role)),
    ))
}

/// POST /api/availability - Cut a window into open slots
pub async fn publish_availability(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Json(request): Json<PublishAvailabilityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let provider_id = acting_provider(&user, request.provider_id)?;
    let service_type = ServiceType::new(
        provider_id.clone(),
        request.service_name,
        request.session_type,
        request.duration_minutes,
        request.price_cents,
    )
    .map_err(SessionError::from)?;
    let availability = Availability::new(
        provider_id,
        service_type.id,
        request.starts_at,
        request.ends_at,
    )
    .map_err(SessionError::from)?;

    let slots = state
        .publish_availability_handler()
        .handle(
            PublishAvailabilityCommand {
                service_type,
                availability,
            },
            command_metadata(&user, &headers),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionListResponse {
            sessions: slots
                .iter()
                .map(|s| SessionResponse::for_viewer(s, user.role))
                .collect(),
        }),
    ))
}

/// POST /api/sessions/:id/book
pub async fn book_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    request: Option<Json<BookSessionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let on_behalf_of = request
        .student_id
        .map(UserId::new)
        .transpose()
        .map_err(SessionError::from)?;
    let cmd = BookSessionCommand {
        session_id: parse_session_id(&session_id)?,
        on_behalf_of,
    };

    let session = state
        .book_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    Ok(Json(SessionResponse::for_viewer(&session, user.role)))
}

/// POST /api/sessions/:id/confirm-payment
pub async fn confirm_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ConfirmPaymentCommand {
        session_id: parse_session_id(&session_id)?,
        payment_id: request.payment_id,
    };

    let result = state
        .confirm_payment_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    Ok(Json(ConfirmPaymentResponse {
        session: SessionResponse::for_viewer(&result.session, user.role),
        meeting_warning: result.meeting_warning,
    }))
}

/// POST /api/sessions/:id/complete
pub async fn complete_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CompleteSessionCommand {
        session_id: parse_session_id(&session_id)?,
    };

    let session = state
        .complete_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    Ok(Json(SessionResponse::for_viewer(&session, user.role)))
}

/// POST /api/sessions/:id/cancel
pub async fn cancel_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<CancelSessionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = CancelSessionCommand {
        session_id: parse_session_id(&session_id)?,
        reason: request.reason,
        note: request.note,
    };

    let result = state
        .cancel_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    Ok(Json(CancelSessionResponse {
        session: SessionResponse::for_viewer(&result.session, user.role),
        refund: result.refund.into(),
    }))
}

/// POST /api/sessions/:id/no-show
pub async fn mark_no_show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<MarkNoShowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = MarkNoShowCommand {
        session_id: parse_session_id(&session_id)?,
        party: request.party,
    };

    let result = state
        .no_show_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    Ok(Json(MarkNoShowResponse {
        session: SessionResponse::for_viewer(&result.session, user.role),
        charge: result.charge.into(),
    }))
}

/// POST /api/sessions/:id/refund
pub async fn process_refund(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = ProcessRefundCommand {
        session_id: parse_session_id(&session_id)?,
    };

    let result = state
        .refund_handler()
        .handle(cmd, command_metadata(&user, &headers))
        .await?;

    Ok(Json(ProcessRefundResponse {
        session: SessionResponse::for_viewer(&result.session, user.role),
        refunded_cents: result.refunded_cents,
        refund_id: result.refund_id,
    }))
}
