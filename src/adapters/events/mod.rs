//! Event bus adapters.
//!
//! - `InMemoryEventBus` - In-process bus that captures events
//! - `TracingEventPublisher` - Logs every event through `tracing`

mod in_memory;
mod tracing_publisher;

pub use in_memory::InMemoryEventBus;
pub use tracing_publisher::TracingEventPublisher;
