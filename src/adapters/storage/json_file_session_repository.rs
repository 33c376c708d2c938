//! JSON-file session repository.
//!
//! All sessions live in one file as a JSON array of camelCase records.
//! Every call reads the file; writes go to a sibling temp file that is then
//! renamed over the original, so readers never see a half-written array.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::session::{Session, SessionRecord};
use crate::ports::{SessionFilter, SessionRepository};

use super::{next_version, sort_by_start, StorageError};

#[derive(Debug)]
pub struct JsonFileSessionRepository {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl JsonFileSessionRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn read_records(&self) -> Result<Vec<SessionRecord>, StorageError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    async fn read_sessions(&self) -> Result<Vec<Session>, StorageError> {
        self.read_records()
            .await?
            .into_iter()
            .map(|record| {
                let id = record.id.to_string();
                Session::try_from(record).map_err(|e| StorageError::InvalidRecord {
                    id,
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    async fn write_sessions(&self, sessions: &[Session]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let records: Vec<SessionRecord> = sessions.iter().map(SessionRecord::from).collect();
        let json = serde_json::to_string_pretty(&records)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await.map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for JsonFileSessionRepository {
    async fn list(&self) -> Result<Vec<Session>, DomainError> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.read_sessions().await?;
        sort_by_start(&mut sessions);
        Ok(sessions)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read_sessions()
            .await?
            .into_iter()
            .find(|s| s.id() == *id))
    }

    async fn upsert(&self, session: &Session) -> Result<u64, DomainError> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.read_sessions().await?;

        let position = sessions.iter().position(|s| s.id() == session.id());
        let stored = position.map(|i| sessions[i].version());
        let version = next_version(stored, session.version())?;

        let mut saved = session.clone();
        saved.set_version(version);
        match position {
            Some(i) => sessions[i] = saved,
            None => sessions.push(saved),
        }

        self.write_sessions(&sessions).await?;
        tracing::debug!(session_id = %session.id(), version, path = %self.path.display(), "Session stored");
        Ok(version)
    }

    async fn filter(&self, filter: &SessionFilter) -> Result<Vec<Session>, DomainError> {
        let _guard = self.lock.lock().await;
        let mut sessions: Vec<Session> = self
            .read_sessions()
            .await?
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect();
        sort_by_start(&mut sessions);
        Ok(sessions)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let _guard = self.lock.lock().await;
        self.write_sessions(&[]).await?;
        tracing::info!(path = %self.path.display(), "Session store cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, ProviderId, Timestamp, UserId};
    use crate::domain::session::{NewSlot, SessionType};
    use tempfile::TempDir;

    fn slot() -> Session {
        let start = Timestamp::parse("2025-06-10T15:00:00Z").unwrap();
        Session::new_available(
            NewSlot {
                provider_id: ProviderId::new("tutor-math-1").unwrap(),
                service_type_id: None,
                availability_id: None,
                session_type: SessionType::Tutoring,
                subject: Some("Math".into()),
                grade_level: None,
                start,
                end: start.plus_minutes(60),
                price_cents: 7500,
            },
            start.minus_hours(48),
        )
        .unwrap()
        .0
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileSessionRepository::new(dir.path().join("sessions.json"));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_persist_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/sessions.json");
        let session = slot();

        JsonFileSessionRepository::new(&path)
            .upsert(&session)
            .await
            .unwrap();

        let reopened = JsonFileSessionRepository::new(&path);
        let stored = reopened.find_by_id(&session.id()).await.unwrap().unwrap();
        assert_eq!(stored.version(), 1);
        assert_eq!(stored.subject(), Some("Math"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn file_holds_camel_case_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        let repo = JsonFileSessionRepository::new(&path);
        repo.upsert(&slot()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["status"], "available");
        assert!(json[0]["scheduledStartTime"].is_string());
    }

    #[tokio::test]
    async fn stale_write_is_rejected() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileSessionRepository::new(dir.path().join("sessions.json"));
        let session = slot();
        repo.upsert(&session).await.unwrap();

        let mut a = repo.find_by_id(&session.id()).await.unwrap().unwrap();
        let mut b = a.clone();
        let student = UserId::new("student-1").unwrap();
        a.book(student.clone(), student.clone(), Timestamp::now()).unwrap();
        repo.upsert(&a).await.unwrap();

        b.book(student.clone(), student, Timestamp::now()).unwrap();
        let err = repo.upsert(&b).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConcurrencyConflict);
    }

    #[tokio::test]
    async fn invalid_record_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        let repo = JsonFileSessionRepository::new(&path);
        repo.upsert(&slot()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        json[0]["amountRefundedCents"] = serde_json::json!(500);
        std::fs::write(&path, json.to_string()).unwrap();

        let err = repo.list().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);
    }

    #[tokio::test]
    async fn clear_empties_the_file() {
        let dir = TempDir::new().unwrap();
        let repo = JsonFileSessionRepository::new(dir.path().join("sessions.json"));
        repo.upsert(&slot()).await.unwrap();
        repo.clear().await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }
}
