//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, the state-machine trait, caller
//! identity, and error types that form the vocabulary of the booking domain.

mod auth;
mod authorization;
mod command;
mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{Actor, AuthError, AuthenticatedUser, Role};
pub use authorization::{authorize, Authorizable, AuthorizationResult};
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent};
pub use ids::{AvailabilityId, ProviderId, ServiceTypeId, SessionId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
