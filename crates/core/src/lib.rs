//! Pocketshop Core - Shared types library.
//!
//! This crate provides the data model used by every Pocketshop component:
//! - `client` - Catalog paging, cart/favorites store, detail reconciliation
//! - `cli` - Terminal front end for browsing and managing the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients, no persistence. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, items, filters, cart lines and money helpers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
