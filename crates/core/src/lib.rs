//! Tangelo Core - Shared types library.
//!
//! This crate provides common types used across all Tangelo client components:
//! - `client` - Storefront client library (stores, API services, guards)
//! - `cli` - Command-line driver for the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, credentials, emails,
//!   minor-unit prices, and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
