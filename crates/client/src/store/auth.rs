//! Auth session store.
//!
//! Holds the current credential and identity for the lifetime of the
//! process, persisted through a [`SessionStore`]. Identity is present iff a
//! credential is present; the two travel together in [`Session`].

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tangelo_core::Credential;

use crate::api::BearerSource;
use crate::storage::{PersistedSession, SessionStore};
use crate::types::User;

/// An authenticated session: credential plus the identity it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub credential: Credential,
    pub user: User,
}

#[derive(Debug)]
struct AuthState {
    session: Option<Session>,
    /// True until [`AuthStore::initialize`] has run; route guards hold
    /// rendering while this is set.
    initializing: bool,
}

/// Process-wide authentication state.
pub struct AuthStore {
    storage: Arc<dyn SessionStore>,
    state: RwLock<AuthState>,
}

impl AuthStore {
    /// Create an uninitialized store backed by the given durable storage.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStore>) -> Self {
        Self {
            storage,
            state: RwLock::new(AuthState {
                session: None,
                initializing: true,
            }),
        }
    }

    /// Restore the session from durable storage.
    ///
    /// Synchronous; no network call is made. Malformed persisted data fails
    /// open to unauthenticated and the corrupt entry is cleared.
    pub fn initialize(&self) {
        let restored = match self.storage.load() {
            Ok(Some(persisted)) => Some(Session {
                credential: persisted.token,
                user: persisted.user,
            }),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(error = %err, "discarding malformed persisted session");
                if let Err(err) = self.storage.clear() {
                    tracing::warn!(error = %err, "failed to clear persisted session");
                }
                None
            }
        };

        let mut state = self.write_state();
        state.session = restored;
        state.initializing = false;
    }

    /// Establish an authenticated session and persist it.
    ///
    /// A persistence failure is logged but does not block the in-memory
    /// login; the session simply won't survive a restart.
    pub fn login(&self, credential: Credential, user: User) {
        let session = Session {
            credential: credential.clone(),
            user: user.clone(),
        };

        if let Err(err) = self.storage.save(&PersistedSession {
            token: credential,
            user,
        }) {
            tracing::warn!(error = %err, "failed to persist session");
        }

        let mut state = self.write_state();
        state.session = Some(session);
        state.initializing = false;
    }

    /// Destroy the session, in memory and in durable storage. Idempotent.
    pub fn logout(&self) {
        if let Err(err) = self.storage.clear() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
        self.write_state().session = None;
    }

    /// Whether [`initialize`](Self::initialize) has not yet completed.
    #[must_use]
    pub fn is_initializing(&self) -> bool {
        self.read_state().initializing
    }

    /// Whether a session is currently established.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().session.is_some()
    }

    /// Snapshot of the current identity.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.read_state().session.as_ref().map(|s| s.user.clone())
    }

    /// Snapshot of the current credential.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.read_state()
            .session
            .as_ref()
            .map(|s| s.credential.clone())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BearerSource for AuthStore {
    fn bearer(&self) -> Option<Credential> {
        self.credential()
    }
}
