//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `mock` - Test implementations that don't require an identity service
//! - `jwt` - HS256 bearer tokens carrying a `role` claim

mod jwt;
mod mock;

pub use jwt::{JwtClaims, JwtConfig, JwtSessionValidator};
pub use mock::MockSessionValidator;
