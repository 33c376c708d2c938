//! HTTP adapter for the provider directory.

mod dto;
mod handlers;
mod routes;

pub use dto::{ProviderResponse, ProviderSearchResponse};
pub use routes::directory_routes;
