//! Storage Adapters
//!
//! Implementations of the `SessionRepository` port.
//!
//! ## Available Adapters
//!
//! - **JsonFileSessionRepository** - One JSON array of session records on disk
//! - **InMemorySessionRepository** - Stores sessions in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemorySessionRepository, JsonFileSessionRepository};
//!
//! let repo = JsonFileSessionRepository::new("./data/sessions.json");
//! let repo = InMemorySessionRepository::new();
//! ```

mod in_memory_session_repository;
mod json_file_session_repository;

pub use in_memory_session_repository::InMemorySessionRepository;
pub use json_file_session_repository::JsonFileSessionRepository;

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::session::Session;

/// Failures of the storage layer itself.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored sessions are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("stored session {id} violates an invariant: {reason}")]
    InvalidRecord { id: String, reason: String },
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::new(ErrorCode::StorageError, err.to_string())
    }
}

/// Version a write will store, or a conflict when `incoming` is stale.
///
/// `stored` is `None` for a record that does not exist yet.
pub(crate) fn next_version(stored: Option<u64>, incoming: u64) -> Result<u64, DomainError> {
    let actual = stored.unwrap_or(0);
    if incoming != actual {
        return Err(DomainError::new(
            ErrorCode::ConcurrencyConflict,
            "session was modified by another writer",
        )
        .with_detail("expected", incoming.to_string())
        .with_detail("actual", actual.to_string()));
    }
    Ok(actual + 1)
}

/// Stable ordering for list results: scheduled start, then id.
pub(crate) fn sort_by_start(sessions: &mut [Session]) {
    sessions.sort_by(|a, b| {
        a.scheduled_start()
            .cmp(&b.scheduled_start())
            .then_with(|| a.id().cmp(&b.id()))
    });
}
