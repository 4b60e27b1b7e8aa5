//! Cart synchronization: hydration, mutation funneling, server authority.

use tangelo_client::error::{ApiError, ClientError};
use tangelo_client::store::CartMetrics;

use tangelo_integration_tests::backend::TestBackend;
use tangelo_integration_tests::{client_against, sign_up};

#[tokio::test]
async fn test_mutations_funnel_the_authoritative_cart_into_the_store() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);
    let gadget = backend.seed_product("Gadget", 1999, 5);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "funnel@example.com", None).await;

    client
        .store
        .add_to_cart(widget.clone(), 2)
        .await
        .into_result()
        .unwrap();
    let metrics = client.store.cart().metrics();
    assert_eq!(metrics.item_count, 2);
    assert_eq!(metrics.total.to_string(), "10.00");

    client
        .store
        .add_to_cart(gadget.clone(), 1)
        .await
        .into_result()
        .unwrap();
    let metrics = client.store.cart().metrics();
    assert_eq!(metrics.item_count, 3);
    assert_eq!(metrics.total.to_string(), "29.99");

    client
        .store
        .update_quantity(&widget, 3)
        .await
        .into_result()
        .unwrap();
    let metrics = client.store.cart().metrics();
    assert_eq!(metrics.item_count, 4);
    assert_eq!(metrics.total.to_string(), "34.99");

    client
        .store
        .remove_from_cart(&gadget)
        .await
        .into_result()
        .unwrap();
    let metrics = client.store.cart().metrics();
    assert_eq!(metrics.item_count, 3);
    assert_eq!(metrics.total.to_string(), "15.00");

    // Metrics always agree with the stored cart.
    let cart = client.store.cart().cart().unwrap();
    assert_eq!(client.store.cart().metrics(), CartMetrics::of(&cart));
}

#[tokio::test]
async fn test_server_rejection_leaves_the_store_untouched() {
    let backend = TestBackend::spawn().await;
    let scarce = backend.seed_product("Scarce", 700, 3);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "stock@example.com", None).await;

    client
        .store
        .add_to_cart(scarce.clone(), 2)
        .await
        .into_result()
        .unwrap();
    let before = client.store.cart().cart().unwrap();
    client.notifier.reset();

    // 2 already in the cart + 2 more exceeds the stock of 3.
    let outcome = client.store.add_to_cart(scarce, 2).await;

    let Err(ClientError::Api(ApiError::Validation(fields))) = outcome.result else {
        panic!("expected a validation failure");
    };
    assert_eq!(fields[0].field, "quantity");
    assert_eq!(client.notifier.messages(), vec!["Insufficient stock"]);

    // No partial mutation was applied.
    assert_eq!(client.store.cart().cart().unwrap(), before);
    assert_eq!(client.store.cart().metrics().item_count, 2);
}

#[tokio::test]
async fn test_quantity_below_one_never_issues_a_request() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "minimum@example.com", None).await;
    client
        .store
        .add_to_cart(widget.clone(), 1)
        .await
        .into_result()
        .unwrap();

    let before = backend.requests().len();

    let outcome = client.store.update_quantity(&widget, 0).await;
    assert!(matches!(
        outcome.result,
        Err(ClientError::QuantityBelowMinimum)
    ));

    let outcome = client.store.add_to_cart(widget.clone(), 0).await;
    assert!(matches!(
        outcome.result,
        Err(ClientError::QuantityBelowMinimum)
    ));

    assert_eq!(backend.requests().len(), before);
    // The decrement control routes through remove instead.
    client
        .store
        .remove_from_cart(&widget)
        .await
        .into_result()
        .unwrap();
    assert!(client.store.cart().cart().unwrap().line_items.is_empty());
}

#[tokio::test]
async fn test_sequential_mutations_land_last_response_wins() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "races@example.com", None).await;

    // Two sequential adds for the same product: each response is a full
    // cart, and the store ends at whichever resolved last.
    client
        .store
        .add_to_cart(widget.clone(), 1)
        .await
        .into_result()
        .unwrap();
    client
        .store
        .add_to_cart(widget, 1)
        .await
        .into_result()
        .unwrap();

    let cart = client.store.cart().cart().unwrap();
    assert_eq!(cart.line_items.len(), 1);
    assert_eq!(cart.line_items[0].quantity, 2);
    assert_eq!(client.store.cart().metrics().item_count, 2);
}

#[tokio::test]
async fn test_malformed_response_is_a_tagged_decode_error() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "decode@example.com", None).await;
    client
        .store
        .add_to_cart(widget, 1)
        .await
        .into_result()
        .unwrap();
    client.notifier.reset();

    backend.corrupt_next_draft_response();
    let outcome = client.store.refresh_cart().await;

    let Err(ClientError::Api(ApiError::Decode { endpoint, .. })) = outcome.result else {
        panic!("expected a decode failure");
    };
    assert_eq!(endpoint, "/orders/draft");
    assert!(client.notifier.contains("unexpected error"));

    // The store kept its last good state.
    assert_eq!(client.store.cart().metrics().item_count, 1);
}
