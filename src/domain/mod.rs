//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, errors, auth, events)
//! - `directory` - Providers, their labels and school coverage
//! - `matching` - Decides which providers qualify for a request
//! - `booking` - Plans, slots and the booking wizard gate
//! - `session` - Session lifecycle state machine and persisted record
//! - `policy` - Refund and no-show pricing, ownership predicates
//! - `offering` - Provider service types and availability windows

pub mod booking;
pub mod directory;
pub mod foundation;
pub mod matching;
pub mod offering;
pub mod policy;
pub mod session;
