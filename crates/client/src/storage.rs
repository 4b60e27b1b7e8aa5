//! Durable session storage.
//!
//! One JSON document at a fixed path holds the credential and the identity
//! it belongs to, behind a trait so tests can substitute an in-memory
//! store. Keeping both in one document means a session never persists
//! half-restored.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tangelo_core::Credential;

use crate::types::User;

/// Errors that can occur reading or writing persisted session state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document exists but cannot be parsed.
    #[error("malformed session data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The durable representation of an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub token: Credential,
    pub user: User,
}

/// Durable storage for the session credential and identity.
pub trait SessionStore: Send + Sync {
    /// Read the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Malformed`] when a document exists but does
    /// not parse; callers are expected to fail open and [`clear`](Self::clear)
    /// the corrupt entry.
    fn load(&self) -> Result<Option<PersistedSession>, StorageError>;

    /// Persist the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;

    /// Remove the persisted session. Removing an absent session is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be modified.
    fn clear(&self) -> Result<(), StorageError>;
}

/// File-backed session store.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let session = serde_json::from_str(&raw)?;
        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(session)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory session store for tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        *self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tangelo_core::{UserId, UserRole};

    fn sample_session() -> PersistedSession {
        PersistedSession {
            token: Credential::new("tok_test"),
            user: User {
                id: UserId::new("u_1"),
                email: "user@example.com".parse().unwrap(),
                role: UserRole::User,
                draft_order_id: None,
                created_at: None,
            },
        }
    }

    fn temp_session_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tangelo-storage-test-{tag}-{}.json", std::process::id()))
    }

    #[test]
    fn test_file_store_round_trip() {
        let store = FileSessionStore::new(temp_session_path("round-trip"));
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());

        store.save(&sample_session()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.token.expose(), "tok_test");
        assert_eq!(loaded.user.id, UserId::new("u_1"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let store = FileSessionStore::new(temp_session_path("idempotent"));
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_reports_malformed_data() {
        let path = temp_session_path("malformed");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(path);
        assert!(matches!(store.load(), Err(StorageError::Malformed(_))));

        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&sample_session()).unwrap();
        assert!(store.load().unwrap().is_some());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
