//! Draft-order (cart), checkout, and order-history endpoints.
//!
//! Every cart mutation returns the backend's full resulting cart; callers
//! push it into the cart store and never patch locally.

use tracing::instrument;

use tangelo_core::{OrderId, OrderStatus, ProductId};

use crate::api::{ApiClient, Paginated};
use crate::error::ApiError;
use crate::types::{
    AddToCartRequest, CheckoutAck, CheckoutSession, Order, UpdateCartItemRequest,
    UpdateOrderStatusRequest,
};

/// Client for `/orders` and `/admin/orders` endpoints.
#[derive(Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    // =========================================================================
    // Draft order (cart)
    // =========================================================================

    /// Fetch the current user's draft order, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn draft_order(&self) -> Result<Option<Order>, ApiError> {
        self.api.get("/orders/draft").await
    }

    /// Add an item to the draft order; returns the full resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; stock problems surface as
    /// [`ApiError::Validation`].
    #[instrument(skip(self), fields(product_id = %request.product_id, quantity = request.quantity))]
    pub async fn add_item(&self, request: &AddToCartRequest) -> Result<Order, ApiError> {
        self.api.post("/orders/draft/items", request).await
    }

    /// Set an item's quantity; returns the full resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn update_item_quantity(
        &self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Order, ApiError> {
        self.api
            .patch(
                &format!("/orders/draft/items/{product_id}"),
                &UpdateCartItemRequest { quantity },
            )
            .await
    }

    /// Remove an item; returns the full resulting cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<Order, ApiError> {
        self.api
            .delete(&format!("/orders/draft/items/{product_id}"))
            .await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Request an externally hosted payment session for the draft order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_checkout_session(&self) -> Result<CheckoutSession, ApiError> {
        self.api.post_empty("/orders/checkout/create-session").await
    }

    /// Report a completed payment session back to the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn confirm_checkout(&self, session_id: &str) -> Result<CheckoutAck, ApiError> {
        self.api
            .get(&format!("/orders/checkout/success?session_id={session_id}"))
            .await
    }

    /// Report an abandoned payment session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn cancel_checkout(&self) -> Result<CheckoutAck, ApiError> {
        self.api.get("/orders/checkout/cancel").await
    }

    // =========================================================================
    // Order history
    // =========================================================================

    /// The signed-in user's orders, paginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self, page: u64) -> Result<Paginated<Order>, ApiError> {
        self.api.get(&format!("/orders?page={page}")).await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// All orders, paginated (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn all_orders(&self, page: u64) -> Result<Paginated<Order>, ApiError> {
        self.api.get(&format!("/admin/orders?page={page}")).await
    }

    /// Update an order's status (admin only); returns the updated order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.api
            .put(
                &format!("/admin/orders/{order_id}"),
                &UpdateOrderStatusRequest { status },
            )
            .await
    }
}
