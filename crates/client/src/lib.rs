//! Tangelo Storefront Client library.
//!
//! A typed client for the Tangelo commerce backend: product browsing, cart
//! management, checkout handoff to the external payment processor,
//! subscription management, and the admin back office.
//!
//! # Architecture
//!
//! - The backend is the source of truth for all cart state. Every mutating
//!   call returns the full resulting cart, which replaces local state
//!   wholesale; the client never applies optimistic deltas.
//! - State lives in two dependency-injected stores ([`store::AuthStore`],
//!   [`store::CartStore`]) owned by the [`state::Storefront`] composition
//!   root. There are no ambient singletons.
//! - Navigation side effects (checkout redirect, forced logout) are returned
//!   as explicit [`nav::Navigation`] values; the embedding layer decides how
//!   to effect them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod nav;
pub mod notify;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;
pub mod types;
