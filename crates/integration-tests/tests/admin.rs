//! Admin back office: guards, catalog management, order management.

use tangelo_client::error::{ApiError, ClientError};
use tangelo_client::guard::{AdminOnly, Authenticated, GuardDecision};
use tangelo_client::nav::Navigation;
use tangelo_client::types::{CreateProductRequest, UpdateProductRequest};
use tangelo_core::{MinorUnits, OrderStatus, ProductType, UserRole};

use tangelo_integration_tests::backend::TestBackend;
use tangelo_integration_tests::{client_against, sign_up};

#[tokio::test]
async fn test_guards_wait_for_initialization_then_gate_by_role() {
    let backend = TestBackend::spawn().await;
    let client = client_against(&backend);

    // Before initialize: hold rendering, no flash redirect.
    assert_eq!(client.store.guard(&Authenticated), GuardDecision::Pending);
    assert_eq!(client.store.guard(&AdminOnly), GuardDecision::Pending);

    client.store.initialize().await;

    // Unauthenticated: both guards send the user to login.
    assert_eq!(
        client.store.guard(&Authenticated),
        GuardDecision::Redirect(Navigation::Login)
    );
    assert_eq!(
        client.store.guard(&AdminOnly),
        GuardDecision::Redirect(Navigation::Login)
    );
}

#[tokio::test]
async fn test_admin_guard_redirects_non_admins_home() {
    let backend = TestBackend::spawn().await;
    let client = client_against(&backend);
    client.store.initialize().await;

    sign_up(&client, "plain@example.com", None).await;
    assert_eq!(client.store.guard(&Authenticated), GuardDecision::Allow);
    assert_eq!(
        client.store.guard(&AdminOnly),
        GuardDecision::Redirect(Navigation::Home)
    );

    client.store.logout();
    sign_up(&client, "boss@example.com", Some(UserRole::Admin)).await;
    assert_eq!(client.store.guard(&AdminOnly), GuardDecision::Allow);
}

#[tokio::test]
async fn test_non_admin_mutation_is_denied_with_a_notice() {
    let backend = TestBackend::spawn().await;
    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "sneaky@example.com", None).await;

    let outcome = client
        .store
        .create_product(&CreateProductRequest {
            name: "Contraband".to_owned(),
            price: MinorUnits::new(100),
            stock: 1,
            product_type: ProductType::OneTime,
        })
        .await;

    assert!(matches!(
        outcome.result,
        Err(ClientError::Api(ApiError::Forbidden))
    ));
    assert!(client.notifier.contains("permission"));
}

#[tokio::test]
async fn test_catalog_mutations_invalidate_the_cache() {
    let backend = TestBackend::spawn().await;
    backend.seed_product("Existing", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "merchant@example.com", Some(UserRole::Admin)).await;

    let first = client.store.products(1).await.into_result().unwrap();
    assert_eq!(first.total, 1);

    // Served from cache: no second GET.
    client.store.products(1).await.into_result().unwrap();
    assert_eq!(backend.request_count("GET /api/v1/products"), 1);

    let created = client
        .store
        .create_product(&CreateProductRequest {
            name: "Fresh".to_owned(),
            price: MinorUnits::new(1500),
            stock: 5,
            product_type: ProductType::OneTime,
        })
        .await
        .into_result()
        .unwrap();

    // The mutation dropped the cache; the next read sees the new product.
    let after = client.store.products(1).await.into_result().unwrap();
    assert_eq!(after.total, 2);
    assert!(after.data.iter().any(|p| p.id == created.id));

    let updated = client
        .store
        .update_product(
            &created.id,
            &UpdateProductRequest {
                stock: Some(42),
                ..UpdateProductRequest::default()
            },
        )
        .await
        .into_result()
        .unwrap();
    assert_eq!(updated.stock, 42);

    client
        .store
        .delete_product(&created.id)
        .await
        .into_result()
        .unwrap();
    let final_page = client.store.products(1).await.into_result().unwrap();
    assert_eq!(final_page.total, 1);
}

#[tokio::test]
async fn test_admin_manages_subscription_plans() {
    let backend = TestBackend::spawn().await;
    let product = backend.seed_product("Premium", 900, 100);

    let client = client_against(&backend);
    client.store.initialize().await;
    sign_up(&client, "planner@example.com", Some(UserRole::Admin)).await;

    let plan = client
        .store
        .create_plan(&tangelo_client::types::CreatePlanRequest {
            product_id: product,
            frequency: tangelo_core::SubscriptionFrequency::Monthly,
            currency: "USD".to_owned(),
            stripe_price_id: "price_123".to_owned(),
        })
        .await
        .into_result()
        .unwrap();

    let updated = client
        .store
        .update_plan(
            &plan.id,
            &tangelo_client::types::UpdatePlanRequest {
                frequency: Some(tangelo_core::SubscriptionFrequency::Yearly),
                ..tangelo_client::types::UpdatePlanRequest::default()
            },
        )
        .await
        .into_result()
        .unwrap();
    assert_eq!(
        updated.frequency,
        tangelo_core::SubscriptionFrequency::Yearly
    );

    client
        .store
        .delete_plan(&plan.id)
        .await
        .into_result()
        .unwrap();
    let plans = client.store.plans().await.into_result().unwrap();
    assert!(plans.is_empty());
}

#[tokio::test]
async fn test_admin_lists_orders_and_updates_status() {
    let backend = TestBackend::spawn().await;
    let widget = backend.seed_product("Widget", 500, 10);

    let client = client_against(&backend);
    client.store.initialize().await;

    // A shopper leaves a draft order behind.
    sign_up(&client, "shopper@example.com", None).await;
    client
        .store
        .add_to_cart(widget, 2)
        .await
        .into_result()
        .unwrap();
    client.store.logout();

    sign_up(&client, "ops@example.com", Some(UserRole::Admin)).await;

    let orders = client.store.admin_orders(1).await.into_result().unwrap();
    assert_eq!(orders.total, 1);
    assert_eq!(orders.limit, 10);
    let order = &orders.data[0];
    assert_eq!(order.status, OrderStatus::Draft);

    let updated = client
        .store
        .update_order_status(&order.id, OrderStatus::Shipped)
        .await
        .into_result()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);

    let refreshed = client.store.admin_orders(1).await.into_result().unwrap();
    assert_eq!(refreshed.data[0].status, OrderStatus::Shipped);
}
