//! Domain types for the Tangelo backend API.
//!
//! Wire field names are camelCase to match the backend's JSON. Prices are
//! minor currency units throughout ([`MinorUnits`]); display conversion
//! happens in the cart store's derived metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use tangelo_core::{
    Credential, Email, MinorUnits, OrderId, OrderStatus, PlanId, ProductId, ProductType,
    SubscriptionFrequency, SubscriptionId, UserId, UserRole,
};

// =============================================================================
// Users & Auth
// =============================================================================

/// A storefront user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
    /// The user's current draft order, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: Credential,
    pub user: User,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Email,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

// =============================================================================
// Orders & Cart
// =============================================================================

/// One product entry within an order, carrying a price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price snapshot in minor currency units.
    pub price: MinorUnits,
    pub quantity: u32,
}

/// An order. While `status` is [`OrderStatus::Draft`] this is the user's
/// cart; at most one draft order exists per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub line_items: Vec<OrderLineItem>,
    pub status: OrderStatus,
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<MinorUnits>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /orders/draft/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `PATCH /orders/draft/items/:productId`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

/// Body of `PUT /admin/orders/:id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// An externally hosted payment-processor session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub checkout_url: Url,
}

/// An externally hosted subscription-management portal session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSession {
    pub portal_url: Url,
}

/// Acknowledgement of a checkout success/cancel callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutAck {
    pub message: String,
}

// =============================================================================
// Catalog
// =============================================================================

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in minor currency units.
    pub price: MinorUnits,
    pub stock: u32,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /products` (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub price: MinorUnits,
    pub stock: u32,
    #[serde(rename = "type")]
    pub product_type: ProductType,
}

/// Body of `PUT /products/:id` (admin); absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<MinorUnits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<ProductType>,
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Product summary embedded in a subscription plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanProduct {
    pub id: ProductId,
    pub name: String,
    pub price: MinorUnits,
}

/// A subscription plan offered on the pricing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub product_id: ProductId,
    pub frequency: SubscriptionFrequency,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Payment-processor price reference; opaque to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<PlanProduct>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /subscription-plans` (admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub product_id: ProductId,
    pub frequency: SubscriptionFrequency,
    pub currency: String,
    pub stripe_price_id: String,
}

/// Body of `PUT /subscription-plans/:id` (admin); absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<SubscriptionFrequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<String>,
}

/// The signed-in user's subscription state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub plan_id: PlanId,
    /// Processor-defined status string (e.g. `active`, `past_due`).
    pub status: String,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /subscriptions/checkout/create-session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionCheckoutRequest {
    pub plan_id: PlanId,
}

// =============================================================================
// Digital content
// =============================================================================

/// Subscription-gated content payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalContent {
    pub content: String,
}
