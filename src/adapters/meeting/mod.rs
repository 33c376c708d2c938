//! Video meeting adapters.
//!
//! - `MockMeetingProvider` - Deterministic links, error injection for tests
//! - `HttpMeetingProvider` - Zoom-style REST API over reqwest

mod http_provider;
mod mock;

pub use http_provider::{HttpMeetingConfig, HttpMeetingProvider};
pub use mock::MockMeetingProvider;
