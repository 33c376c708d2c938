//! HTTP adapter - axum routes over the application handlers.
//!
//! Each endpoint family has its own `dto`/`handlers`/`routes` trio;
//! `router::app_router` mounts them under `/api` behind the auth middleware.

pub mod checkout;
pub mod directory;
pub mod error;
pub mod metadata;
pub mod middleware;
pub mod router;
pub mod session;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::{app_router, RouterSettings};
pub use state::AppState;
