//! Command metadata for HTTP-originated commands.

use axum::http::HeaderMap;

use crate::domain::foundation::{AuthenticatedUser, CommandMetadata};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds metadata for a command issued by `user`.
///
/// The caller's `x-request-id` becomes the correlation id when present.
pub fn command_metadata(user: &AuthenticatedUser, headers: &HeaderMap) -> CommandMetadata {
    let metadata = CommandMetadata::new(user.actor()).with_source("http");
    match headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        Some(request_id) => metadata.with_correlation_id(request_id),
        None => metadata,
    }
}
