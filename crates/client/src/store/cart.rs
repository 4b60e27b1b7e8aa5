//! Cart synchronization store.
//!
//! Mirrors the backend's draft order for the current identity. The single
//! mutation entry point is [`CartStore::set_cart`]: the stored cart is
//! replaced wholesale and the derived metrics are recomputed under the same
//! write lock, so no reader ever observes a stale cart/metrics pairing.
//!
//! Every cart-mutating operation republishes the server's authoritative
//! resulting cart through this store. Local optimistic deltas are never
//! applied; server-side rejections (stock exhaustion, price drift) are
//! therefore reflected immediately and exactly.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use rust_decimal::Decimal;

use tangelo_core::MinorUnits;

use crate::types::Order;

/// Metrics derived from the cart's line items.
///
/// A pure function of the current cart; never incrementally patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartMetrics {
    /// Sum of line-item quantities.
    pub item_count: u32,
    /// Sum of `price × quantity`, in major currency units for display.
    pub total: Decimal,
}

impl CartMetrics {
    /// Metrics of an absent or empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item_count: 0,
            total: Decimal::ZERO,
        }
    }

    /// Compute metrics from an order's line items.
    #[must_use]
    pub fn of(order: &Order) -> Self {
        let item_count = order.line_items.iter().map(|line| line.quantity).sum();
        let total = order
            .line_items
            .iter()
            .map(|line| line.price.times(line.quantity))
            .sum::<MinorUnits>()
            .major();
        Self { item_count, total }
    }
}

#[derive(Debug)]
struct CartState {
    cart: Option<Order>,
    metrics: CartMetrics,
}

/// Process-wide cart state; sole owner of the draft order and its metrics.
pub struct CartStore {
    state: RwLock<CartState>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create an empty cart store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: RwLock::new(CartState {
                cart: None,
                metrics: CartMetrics::empty(),
            }),
        }
    }

    /// Replace the stored cart wholesale and recompute derived metrics.
    ///
    /// After this returns, the metrics are consistent with the stored cart.
    pub fn set_cart(&self, cart: Option<Order>) {
        let metrics = cart.as_ref().map_or_else(CartMetrics::empty, CartMetrics::of);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.cart = cart;
        state.metrics = metrics;
    }

    /// Drop the cart (used on logout and after a completed checkout).
    pub fn clear(&self) {
        self.set_cart(None);
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Option<Order> {
        self.read_state().cart.clone()
    }

    /// Snapshot of the derived metrics.
    #[must_use]
    pub fn metrics(&self) -> CartMetrics {
        self.read_state().metrics.clone()
    }

    /// Whether the cart is absent or has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_state()
            .cart
            .as_ref()
            .is_none_or(|cart| cart.line_items.is_empty())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CartState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
