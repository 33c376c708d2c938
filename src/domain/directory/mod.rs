//! Provider directory - who offers what, for which schools.
//!
//! The directory is a static input to matching. Nothing in the domain
//! mutates it; a new snapshot replaces the old one wholesale.

mod catalog;
mod labels;
mod provider;

pub use catalog::{DirectoryError, ProviderDirectory, ProviderRecord};
pub use labels::{normalize, NormalizedName, ProviderLabel, School, ServiceKind, TestName, TutoringSubject};
pub use provider::{Provider, ProviderRole, SchoolScope};
