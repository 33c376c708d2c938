//! Directory queries.

mod find_providers;

pub use find_providers::{FindProvidersHandler, FindProvidersResult};
