//! Process-wide state stores.
//!
//! Two stores mirror server state for the lifetime of the client: the auth
//! session and the draft-order cart. Both are mutated only through their
//! exposed entry points; views read snapshots and never keep copies.

mod auth;
mod cart;

pub use auth::{AuthStore, Session};
pub use cart::{CartMetrics, CartStore};
