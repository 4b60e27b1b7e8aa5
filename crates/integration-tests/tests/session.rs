//! Session lifecycle: login, persisted restore, forced logout.

use std::sync::Arc;
use std::time::Duration;

use tangelo_client::config::ClientConfig;
use tangelo_client::error::{ApiError, ClientError};
use tangelo_client::nav::Navigation;
use tangelo_client::state::Storefront;
use tangelo_client::storage::{FileSessionStore, SessionStore};

use tangelo_integration_tests::backend::TestBackend;
use tangelo_integration_tests::notifier::RecordingNotifier;
use tangelo_integration_tests::{client_against, client_with_storage, sign_in, sign_up};

#[tokio::test]
async fn test_login_hydrates_cart_for_the_identity() {
    let backend = TestBackend::spawn().await;
    let product = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "shopper@example.com", None).await;

    client
        .store
        .add_to_cart(product.clone(), 2)
        .await
        .into_result()
        .unwrap();
    client.store.logout();
    assert_eq!(client.store.cart().metrics().item_count, 0);

    // A fresh login pulls the server-side draft back in.
    sign_in(&client, "shopper@example.com").await;
    let metrics = client.store.cart().metrics();
    assert_eq!(metrics.item_count, 2);
    assert_eq!(metrics.total.to_string(), "10.00");
}

#[tokio::test]
async fn test_initialize_restores_persisted_session_and_cart() {
    let backend = TestBackend::spawn().await;
    let product = backend.seed_product("Widget", 500, 10);

    let first = client_against(&backend);
    first.store.initialize().await;
    sign_up(&first, "restore@example.com", None).await;
    first
        .store
        .add_to_cart(product, 1)
        .await
        .into_result()
        .unwrap();

    // Same durable storage, new process.
    let second = client_with_storage(&backend, first.storage.clone());
    assert!(second.store.auth().is_initializing());

    let navigate = second.store.initialize().await;
    assert_eq!(navigate, Navigation::Stay);
    assert!(second.store.auth().is_authenticated());
    assert_eq!(second.store.cart().metrics().item_count, 1);
}

#[tokio::test]
async fn test_initialize_fails_open_on_corrupt_session_file() {
    let backend = TestBackend::spawn().await;

    let state_dir = std::env::temp_dir().join(format!(
        "tangelo-it-{}",
        uuid::Uuid::new_v4()
    ));
    std::fs::create_dir_all(&state_dir).unwrap();
    let session_file = state_dir.join("session.json");
    std::fs::write(&session_file, "{definitely not json").unwrap();

    let config = ClientConfig {
        api_base_url: backend.base_url().parse().unwrap(),
        request_timeout: Duration::from_secs(5),
        state_dir,
    };
    let store = Storefront::new(
        config.clone(),
        Arc::new(FileSessionStore::new(config.session_file())),
        Arc::new(RecordingNotifier::new()),
    )
    .unwrap();

    let navigate = store.initialize().await;

    assert_eq!(navigate, Navigation::Stay);
    assert!(!store.auth().is_authenticated());
    assert!(!store.auth().is_initializing());
    // The corrupt entry is gone.
    assert!(!config.session_file().exists());
}

#[tokio::test]
async fn test_rejected_credential_forces_logout_and_login_redirect() {
    let backend = TestBackend::spawn().await;
    let product = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "expired@example.com", None).await;
    client
        .store
        .add_to_cart(product, 1)
        .await
        .into_result()
        .unwrap();

    client.store.set_location("/cart");
    backend.revoke_all_tokens();

    let outcome = client.store.refresh_cart().await;

    assert!(matches!(
        outcome.result,
        Err(ClientError::Api(ApiError::Unauthorized))
    ));
    assert_eq!(outcome.navigate, Navigation::Login);
    assert!(!client.store.auth().is_authenticated());
    assert!(client.store.cart().cart().is_none());
    assert!(client.notifier.contains("Session expired"));

    // Durable storage is cleared too: a restart stays signed out.
    assert!(client.storage.load().unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_credential_on_login_view_does_not_redirect() {
    let backend = TestBackend::spawn().await;

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "looper@example.com", None).await;

    client.store.set_location("/login");
    backend.revoke_all_tokens();

    let outcome = client.store.refresh_cart().await;

    assert!(matches!(
        outcome.result,
        Err(ClientError::Api(ApiError::Unauthorized))
    ));
    assert_eq!(outcome.navigate, Navigation::Stay);
    assert!(!client.store.auth().is_authenticated());
    assert!(!client.notifier.contains("Session expired"));
}

#[tokio::test]
async fn test_invalid_credentials_surface_as_unauthorized() {
    let backend = TestBackend::spawn().await;

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "typo@example.com", None).await;
    client.store.logout();

    let email = "typo@example.com".parse().unwrap();
    let password = secrecy::SecretString::from("wrong-password");
    let outcome = client.store.login(&email, &password).await;

    assert!(matches!(
        outcome.result,
        Err(ClientError::Api(ApiError::Unauthorized))
    ));
    assert!(!client.store.auth().is_authenticated());
}

#[tokio::test]
async fn test_duplicate_registration_surfaces_field_notice() {
    let backend = TestBackend::spawn().await;

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "taken@example.com", None).await;
    client.store.logout();
    client.notifier.reset();

    let email = "taken@example.com".parse().unwrap();
    let password = secrecy::SecretString::from("another-password");
    let outcome = client.store.register(&email, &password, None).await;

    let Err(ClientError::Api(ApiError::Validation(fields))) = outcome.result else {
        panic!("expected a validation failure");
    };
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field, "email");
    assert_eq!(client.notifier.messages(), vec!["Email is already taken"]);
}
