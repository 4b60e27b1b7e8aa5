//! Storefront composition root.
//!
//! [`Storefront`] owns the configuration, the API client, both state stores,
//! and the notifier, and exposes every user-facing operation. Dependencies
//! are injected at construction; there are no ambient singletons, which
//! keeps tests isolated.
//!
//! Ordering: store writes land in callback-completion order, not
//! request-issue order. Two in-flight mutations against the same cart race
//! last-response-wins; the backend's response is always taken as ground
//! truth, whichever arrives last.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;
use tracing::instrument;

use tangelo_core::{Email, OrderId, OrderStatus, PlanId, ProductId, SubscriptionId, UserRole};

use crate::api::{ApiClient, BearerSource, Paginated};
use crate::config::{ClientConfig, ConfigError};
use crate::error::{ApiError, ClientError};
use crate::guard::{self, Capability, GuardDecision};
use crate::nav::{HOME_PATH, LOGIN_PATH, Navigation};
use crate::notify::{NoticeLevel, Notifier};
use crate::services::{AuthService, CatalogService, ContentService, OrderService, SubscriptionService};
use crate::storage::SessionStore;
use crate::store::{AuthStore, CartStore};
use crate::types::{
    AddToCartRequest, CreatePlanRequest, CreateProductRequest, DigitalContent, Order, Product,
    SubscriptionPlan, UpdatePlanRequest, UpdateProductRequest, User, UserSubscription,
};

/// Outcome of a storefront operation: the result plus an explicit
/// navigation intent for the caller to effect.
#[must_use]
#[derive(Debug)]
pub struct OpResult<T> {
    pub result: Result<T, ClientError>,
    pub navigate: Navigation,
}

impl<T> OpResult<T> {
    fn ok(value: T) -> Self {
        Self {
            result: Ok(value),
            navigate: Navigation::Stay,
        }
    }

    fn ok_with(value: T, navigate: Navigation) -> Self {
        Self {
            result: Ok(value),
            navigate,
        }
    }

    fn err(error: impl Into<ClientError>) -> Self {
        Self {
            result: Err(error.into()),
            navigate: Navigation::Stay,
        }
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Unwrap into the inner result, discarding the navigation intent.
    ///
    /// # Errors
    ///
    /// Returns the operation's error.
    pub fn into_result(self) -> Result<T, ClientError> {
        self.result
    }
}

/// The storefront client: composition root over stores and services.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: ClientConfig,
    auth: Arc<AuthStore>,
    cart: CartStore,
    notifier: Arc<dyn Notifier>,
    auth_api: AuthService,
    orders: OrderService,
    catalog: CatalogService,
    subscriptions: SubscriptionService,
    content: ContentService,
    /// Current view path, mirrored in by the embedding layer; used only to
    /// suppress the forced-logout redirect on the login view.
    location: RwLock<String>,
    checkout_in_flight: AtomicBool,
}

impl Storefront {
    /// Wire up the client from its injected dependencies.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        let auth = Arc::new(AuthStore::new(storage));
        let bearer: Arc<dyn BearerSource> = auth.clone();
        let api = ApiClient::new(&config, bearer, notifier.clone())?;

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                auth,
                cart: CartStore::new(),
                notifier,
                auth_api: AuthService::new(api.clone()),
                orders: OrderService::new(api.clone()),
                catalog: CatalogService::new(api.clone()),
                subscriptions: SubscriptionService::new(api.clone()),
                content: ContentService::new(api),
                location: RwLock::new(HOME_PATH.to_owned()),
                checkout_in_flight: AtomicBool::new(false),
            }),
        })
    }

    /// The auth session store.
    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    /// The cart synchronization store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Record the current view path.
    pub fn set_location(&self, path: &str) {
        *self
            .inner
            .location
            .write()
            .unwrap_or_else(PoisonError::into_inner) = path.to_owned();
    }

    /// The current view path.
    #[must_use]
    pub fn location(&self) -> String {
        self.inner
            .location
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Evaluate a route guard against the current auth state.
    #[must_use]
    pub fn guard<C: Capability>(&self, capability: &C) -> GuardDecision {
        guard::decide(capability, &self.inner.auth)
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Restore the session from durable storage and hydrate the cart.
    ///
    /// Returns a navigation intent: `Login` when a restored credential turns
    /// out to be stale (hydration was rejected), `Stay` otherwise.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Navigation {
        self.inner.auth.initialize();

        if self.inner.auth.is_authenticated() {
            return self.hydrate_cart().await;
        }

        Navigation::Stay
    }

    /// Log in and hydrate the cart for the new identity.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> OpResult<User> {
        match self.inner.auth_api.login(email, password).await {
            Ok(response) => {
                self.inner
                    .auth
                    .login(response.token, response.user.clone());
                self.hydrate_cart().await;
                OpResult::ok_with(response.user, Navigation::Home)
            }
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Register a new account; logs in with the returned session.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn register(
        &self,
        email: &Email,
        password: &SecretString,
        role: Option<UserRole>,
    ) -> OpResult<User> {
        match self.inner.auth_api.register(email, password, role).await {
            Ok(response) => {
                self.inner
                    .auth
                    .login(response.token, response.user.clone());
                OpResult::ok_with(response.user, Navigation::Home)
            }
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Log out. Both stores return to their initial state.
    pub fn logout(&self) -> Navigation {
        self.inner.auth.logout();
        self.inner.cart.clear();
        Navigation::Home
    }

    // =========================================================================
    // Cart operations
    // =========================================================================

    /// Add an item to the cart.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> OpResult<()> {
        if quantity < 1 {
            return OpResult::err(ClientError::QuantityBelowMinimum);
        }

        let result = self
            .inner
            .orders
            .add_item(&AddToCartRequest {
                product_id,
                quantity,
            })
            .await;
        self.apply_cart(result)
    }

    /// Set a line item's quantity.
    ///
    /// Quantities below 1 are rejected before any request is issued; a
    /// decrement to zero must route through [`remove_from_cart`](Self::remove_from_cart).
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn update_quantity(&self, product_id: &ProductId, quantity: u32) -> OpResult<()> {
        if quantity < 1 {
            return OpResult::err(ClientError::QuantityBelowMinimum);
        }

        let result = self
            .inner
            .orders
            .update_item_quantity(product_id, quantity)
            .await;
        self.apply_cart(result)
    }

    /// Remove a line item.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> OpResult<()> {
        let result = self.inner.orders.remove_item(product_id).await;
        self.apply_cart(result)
    }

    /// Re-fetch the draft order into the cart store.
    #[instrument(skip(self))]
    pub async fn refresh_cart(&self) -> OpResult<()> {
        match self.inner.orders.draft_order().await {
            Ok(cart) => {
                self.inner.cart.set_cart(cart);
                OpResult::ok(())
            }
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Start a checkout: returns the external payment URL as a navigation
    /// intent. A second call while one is pending is rejected.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> OpResult<()> {
        if self.inner.checkout_in_flight.swap(true, Ordering::SeqCst) {
            return OpResult::err(ClientError::CheckoutInProgress);
        }

        match self.inner.orders.create_checkout_session().await {
            // The latch stays set on success: navigation leaves the app, and
            // the confirm/cancel handlers release it on return.
            Ok(session) => OpResult::ok_with((), Navigation::External(session.checkout_url)),
            Err(err) => {
                self.inner.checkout_in_flight.store(false, Ordering::SeqCst);
                self.settle(Err(err))
            }
        }
    }

    /// Report a completed payment session; the draft order is gone, so the
    /// cart store is cleared.
    #[instrument(skip(self))]
    pub async fn confirm_checkout(&self, session_id: &str) -> OpResult<String> {
        self.inner.checkout_in_flight.store(false, Ordering::SeqCst);

        match self.inner.orders.confirm_checkout(session_id).await {
            Ok(ack) => {
                self.inner.cart.clear();
                self.inner
                    .notifier
                    .notify(NoticeLevel::Success, "Payment successful!");
                OpResult::ok(ack.message)
            }
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Report an abandoned payment session; the cart is left as-is.
    #[instrument(skip(self))]
    pub async fn cancel_checkout(&self) -> OpResult<String> {
        self.inner.checkout_in_flight.store(false, Ordering::SeqCst);

        match self.inner.orders.cancel_checkout().await {
            Ok(ack) => OpResult::ok(ack.message),
            Err(err) => self.settle(Err(err)),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// A page of products.
    pub async fn products(&self, page: u64) -> OpResult<Paginated<Product>> {
        let result = self.inner.catalog.products(page).await;
        self.settle(result)
    }

    /// A single product.
    pub async fn product(&self, id: &ProductId) -> OpResult<Product> {
        let result = self.inner.catalog.product(id).await;
        self.settle(result)
    }

    /// Create a product (admin only).
    pub async fn create_product(&self, request: &CreateProductRequest) -> OpResult<Product> {
        let result = self.inner.catalog.create_product(request).await;
        self.settle(result)
    }

    /// Update a product (admin only).
    pub async fn update_product(
        &self,
        id: &ProductId,
        request: &UpdateProductRequest,
    ) -> OpResult<Product> {
        let result = self.inner.catalog.update_product(id, request).await;
        self.settle(result)
    }

    /// Delete a product (admin only).
    pub async fn delete_product(&self, id: &ProductId) -> OpResult<()> {
        let result = self.inner.catalog.delete_product(id).await;
        self.settle(result)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// The signed-in user's order history.
    pub async fn my_orders(&self, page: u64) -> OpResult<Paginated<Order>> {
        let result = self.inner.orders.my_orders(page).await;
        self.settle(result)
    }

    /// All orders (admin only).
    pub async fn admin_orders(&self, page: u64) -> OpResult<Paginated<Order>> {
        let result = self.inner.orders.all_orders(page).await;
        self.settle(result)
    }

    /// Update an order's status (admin only).
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> OpResult<Order> {
        let result = self.inner.orders.update_status(order_id, status).await;
        self.settle(result)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// All subscription plans.
    pub async fn plans(&self) -> OpResult<Vec<SubscriptionPlan>> {
        let result = self.inner.catalog.plans().await;
        self.settle(result)
    }

    /// A single subscription plan.
    pub async fn plan(&self, id: &PlanId) -> OpResult<SubscriptionPlan> {
        let result = self.inner.catalog.plan(id).await;
        self.settle(result)
    }

    /// Create a subscription plan (admin only).
    pub async fn create_plan(&self, request: &CreatePlanRequest) -> OpResult<SubscriptionPlan> {
        let result = self.inner.catalog.create_plan(request).await;
        self.settle(result)
    }

    /// Update a subscription plan (admin only).
    pub async fn update_plan(
        &self,
        id: &PlanId,
        request: &UpdatePlanRequest,
    ) -> OpResult<SubscriptionPlan> {
        let result = self.inner.catalog.update_plan(id, request).await;
        self.settle(result)
    }

    /// Delete a subscription plan (admin only).
    pub async fn delete_plan(&self, id: &PlanId) -> OpResult<()> {
        let result = self.inner.catalog.delete_plan(id).await;
        self.settle(result)
    }

    /// Start a subscription checkout: returns the external payment URL.
    #[instrument(skip(self), fields(plan_id = %plan_id))]
    pub async fn subscribe(&self, plan_id: &PlanId) -> OpResult<()> {
        match self.inner.subscriptions.create_checkout_session(plan_id).await {
            Ok(session) => OpResult::ok_with((), Navigation::External(session.checkout_url)),
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Report a completed subscription checkout.
    pub async fn confirm_subscription_checkout(&self, session_id: &str) -> OpResult<String> {
        match self.inner.subscriptions.confirm_checkout(session_id).await {
            Ok(ack) => OpResult::ok(ack.message),
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Report an abandoned subscription checkout.
    pub async fn cancel_subscription_checkout(&self) -> OpResult<String> {
        match self.inner.subscriptions.cancel_checkout().await {
            Ok(ack) => OpResult::ok(ack.message),
            Err(err) => self.settle(Err(err)),
        }
    }

    /// The signed-in user's subscription, if any.
    pub async fn my_subscription(&self) -> OpResult<Option<UserSubscription>> {
        let result = self.inner.subscriptions.my_subscription().await;
        self.settle(result)
    }

    /// Open the external subscription-management portal.
    #[instrument(skip(self))]
    pub async fn subscription_portal(&self) -> OpResult<()> {
        match self.inner.subscriptions.create_portal_session().await {
            Ok(session) => OpResult::ok_with((), Navigation::External(session.portal_url)),
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Cancel a subscription.
    pub async fn cancel_subscription(&self, id: &SubscriptionId) -> OpResult<()> {
        let result = self.inner.subscriptions.cancel(id).await;
        self.settle(result)
    }

    /// Fetch the subscription-gated content payload.
    pub async fn digital_content(&self) -> OpResult<DigitalContent> {
        let result = self.inner.content.digital_content().await;
        self.settle(result)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Fetch the draft order into the cart store. Hydration failures other
    /// than a credential rejection are logged, not fatal.
    async fn hydrate_cart(&self) -> Navigation {
        match self.inner.orders.draft_order().await {
            Ok(cart) => {
                self.inner.cart.set_cart(cart);
                Navigation::Stay
            }
            Err(ApiError::Unauthorized) => self.force_logout(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to hydrate cart");
                Navigation::Stay
            }
        }
    }

    /// Publish a mutation's authoritative cart, or leave the store untouched
    /// on failure.
    fn apply_cart(&self, result: Result<Order, ApiError>) -> OpResult<()> {
        match result {
            Ok(cart) => {
                self.inner.cart.set_cart(Some(cart));
                OpResult::ok(())
            }
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Convert a service result, handling the forced-logout contract for
    /// rejected credentials.
    fn settle<T>(&self, result: Result<T, ApiError>) -> OpResult<T> {
        match result {
            Ok(value) => OpResult::ok(value),
            Err(ApiError::Unauthorized) => OpResult {
                result: Err(ApiError::Unauthorized.into()),
                navigate: self.force_logout(),
            },
            Err(err) => OpResult::err(err),
        }
    }

    /// Destroy the session after a credential rejection. Redirects to the
    /// login view unless the user is already there.
    fn force_logout(&self) -> Navigation {
        self.inner.auth.logout();
        self.inner.cart.clear();

        if self.location() == LOGIN_PATH {
            Navigation::Stay
        } else {
            self.inner
                .notifier
                .notify(NoticeLevel::Error, "Session expired. Please login again.");
            Navigation::Login
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::notify::TracingNotifier;
    use crate::storage::MemorySessionStore;
    use crate::types::OrderLineItem;
    use tangelo_core::{Credential, MinorUnits, UserId};

    fn storefront() -> Storefront {
        let config = ClientConfig {
            api_base_url: "http://127.0.0.1:9/api/v1".parse().unwrap(),
            request_timeout: std::time::Duration::from_secs(1),
            state_dir: std::env::temp_dir(),
        };
        Storefront::new(
            config,
            Arc::new(MemorySessionStore::new()),
            Arc::new(TracingNotifier),
        )
        .unwrap()
    }

    fn draft_order() -> Order {
        Order {
            id: OrderId::new("o_1"),
            line_items: vec![OrderLineItem {
                product_id: ProductId::new("p_1"),
                name: "Widget".to_owned(),
                price: MinorUnits::new(500),
                quantity: 2,
            }],
            status: OrderStatus::Draft,
            user_id: UserId::new("u_1"),
            total_amount: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_quantity_below_one_is_rejected_without_a_request() {
        // The base URL points at a dead port; reaching the network would
        // error differently than the client-side rejection asserted here.
        let store = storefront();

        let result = store.update_quantity(&ProductId::new("p_1"), 0).await;
        assert!(matches!(
            result.result,
            Err(ClientError::QuantityBelowMinimum)
        ));
        assert_eq!(result.navigate, Navigation::Stay);

        let result = store.add_to_cart(ProductId::new("p_1"), 0).await;
        assert!(matches!(
            result.result,
            Err(ClientError::QuantityBelowMinimum)
        ));
    }

    #[test]
    fn test_logout_resets_both_stores() {
        let store = storefront();
        store.auth().initialize();
        store.auth().login(
            Credential::new("tok"),
            User {
                id: UserId::new("u_1"),
                email: "user@example.com".parse().unwrap(),
                role: UserRole::User,
                draft_order_id: None,
                created_at: None,
            },
        );
        store.cart().set_cart(Some(draft_order()));
        assert!(store.auth().is_authenticated());
        assert_eq!(store.cart().metrics().item_count, 2);

        let navigate = store.logout();
        assert_eq!(navigate, Navigation::Home);
        assert!(!store.auth().is_authenticated());
        assert!(store.cart().cart().is_none());
        assert_eq!(store.cart().metrics().item_count, 0);
    }

    #[test]
    fn test_location_defaults_to_home() {
        let store = storefront();
        assert_eq!(store.location(), HOME_PATH);

        store.set_location("/cart");
        assert_eq!(store.location(), "/cart");
    }
}
