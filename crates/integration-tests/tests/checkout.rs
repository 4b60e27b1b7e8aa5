//! Checkout handoff to the external payment processor.

use tangelo_client::error::{ApiError, ClientError};
use tangelo_client::nav::Navigation;
use tangelo_core::OrderStatus;

use tangelo_integration_tests::backend::TestBackend;
use tangelo_integration_tests::{client_against, sign_up};

#[tokio::test]
async fn test_checkout_returns_the_external_payment_url() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "buyer@example.com", None).await;
    client
        .store
        .add_to_cart(widget, 2)
        .await
        .into_result()
        .unwrap();

    let outcome = client.store.checkout().await;

    assert!(outcome.is_ok());
    let Navigation::External(url) = outcome.navigate else {
        panic!("expected an external navigation intent");
    };
    assert_eq!(url.host_str(), Some("checkout.test"));
}

#[tokio::test]
async fn test_second_checkout_while_pending_is_rejected() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "doubleclick@example.com", None).await;
    client
        .store
        .add_to_cart(widget, 1)
        .await
        .into_result()
        .unwrap();

    let first = client.store.checkout().await;
    assert!(first.is_ok());

    let second = client.store.checkout().await;
    assert!(matches!(
        second.result,
        Err(ClientError::CheckoutInProgress)
    ));
    assert_eq!(backend.request_count("checkout/create-session"), 1);
}

#[tokio::test]
async fn test_failed_checkout_releases_the_latch() {
    let backend = TestBackend::spawn().await;

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "emptycart@example.com", None).await;

    // Empty cart: the backend rejects the session request.
    let outcome = client.store.checkout().await;
    assert!(matches!(
        outcome.result,
        Err(ClientError::Api(ApiError::Unexpected { status: 422, .. }))
    ));
    assert!(client.notifier.contains("Cart is empty"));

    // The latch is free again for a retry.
    let widget = backend.seed_product("Widget", 500, 10);
    client
        .store
        .add_to_cart(widget, 1)
        .await
        .into_result()
        .unwrap();
    let retry = client.store.checkout().await;
    assert!(retry.is_ok());
}

#[tokio::test]
async fn test_confirmed_checkout_clears_the_cart() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "paid@example.com", None).await;
    client
        .store
        .add_to_cart(widget, 2)
        .await
        .into_result()
        .unwrap();

    let outcome = client.store.checkout().await;
    assert!(outcome.is_ok());

    let message = client
        .store
        .confirm_checkout("cs_fake")
        .await
        .into_result()
        .unwrap();
    assert_eq!(message, "Payment successful");

    assert!(client.store.cart().cart().is_none());
    assert_eq!(client.store.cart().metrics().item_count, 0);

    // The paid order is no longer a draft on the server either.
    client.store.refresh_cart().await.into_result().unwrap();
    assert!(client.store.cart().cart().is_none());

    // But it shows up in the order history.
    let history = client.store.my_orders(1).await.into_result().unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.data[0].status, OrderStatus::Paid);
}

#[tokio::test]
async fn test_cancelled_checkout_keeps_the_cart() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "cancelled@example.com", None).await;
    client
        .store
        .add_to_cart(widget, 2)
        .await
        .into_result()
        .unwrap();

    let outcome = client.store.checkout().await;
    assert!(outcome.is_ok());

    client
        .store
        .cancel_checkout()
        .await
        .into_result()
        .unwrap();

    // Cart untouched, and the latch is released for another attempt.
    assert_eq!(client.store.cart().metrics().item_count, 2);
    let retry = client.store.checkout().await;
    assert!(retry.is_ok());
    assert_eq!(backend.request_count("checkout/create-session"), 2);
}
