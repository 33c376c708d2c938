//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod checkout;
pub mod directory;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use checkout::*;
pub use directory::*;
pub use session::*;
