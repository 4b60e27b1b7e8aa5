//! Integration tests for the Tangelo storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tangelo-integration-tests
//! ```
//!
//! Every test spins an in-process mock backend ([`backend::TestBackend`]) on
//! an ephemeral port and drives the real client against it over HTTP. The
//! mock implements the backend's response envelope, bearer authentication,
//! and error bodies, and records every request so tests can assert that a
//! request was (or was not) issued.
//!
//! # Test Categories
//!
//! - `session` - login, persisted-session restore, forced logout
//! - `cart_sync` - cart hydration and mutation funneling
//! - `checkout` - payment-session handoff and the in-flight latch
//! - `subscriptions` - plans, subscription checkout, portal, gated content
//! - `admin` - guards, product/plan management, order management

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

pub mod backend;
pub mod notifier;

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use tangelo_client::config::ClientConfig;
use tangelo_client::state::Storefront;
use tangelo_client::storage::MemorySessionStore;
use tangelo_client::types::User;
use tangelo_core::{Email, UserRole};

use backend::TestBackend;
use notifier::RecordingNotifier;

/// Password used by every test account.
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// A storefront client wired against a test backend, with its doubles
/// exposed for assertions.
pub struct TestClient {
    pub store: Storefront,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: Arc<MemorySessionStore>,
}

/// Build a client against the given backend with fresh in-memory doubles.
///
/// # Panics
///
/// Panics if the backend URL is unparseable or client construction fails.
#[must_use]
pub fn client_against(backend: &TestBackend) -> TestClient {
    let storage = Arc::new(MemorySessionStore::new());
    client_with_storage(backend, storage)
}

/// Build a client reusing existing session storage (for restart scenarios).
///
/// # Panics
///
/// Panics if the backend URL is unparseable or client construction fails.
#[must_use]
pub fn client_with_storage(backend: &TestBackend, storage: Arc<MemorySessionStore>) -> TestClient {
    let config = ClientConfig {
        api_base_url: backend.base_url().parse().unwrap(),
        request_timeout: Duration::from_secs(5),
        state_dir: std::env::temp_dir(),
    };

    let notifier = Arc::new(RecordingNotifier::new());
    let store = Storefront::new(config, storage.clone(), notifier.clone()).unwrap();

    TestClient {
        store,
        notifier,
        storage,
    }
}

/// Register an account through the client and return the signed-in identity.
pub async fn sign_up(client: &TestClient, email: &str, role: Option<UserRole>) -> User {
    let email: Email = email.parse().unwrap();
    let password = SecretString::from(TEST_PASSWORD);
    client
        .store
        .register(&email, &password, role)
        .await
        .into_result()
        .unwrap()
}

/// Sign in to an existing account through the client.
pub async fn sign_in(client: &TestClient, email: &str) -> User {
    let email: Email = email.parse().unwrap();
    let password = SecretString::from(TEST_PASSWORD);
    client
        .store
        .login(&email, &password)
        .await
        .into_result()
        .unwrap()
}
