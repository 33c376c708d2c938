//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CancelSessionRequest, CreateSlotRequest, ListSessionsParams, SessionListResponse,
    SessionResponse,
};
pub use routes::{availability_routes, session_routes};
