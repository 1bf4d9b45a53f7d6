//! Core types for Pocketshop.
//!
//! This module provides type-safe wrappers for catalog and cart concepts.

pub mod cart;
pub mod id;
pub mod item;
pub mod price;

pub use cart::CartLine;
pub use id::*;
pub use item::{Filter, Item, Rating};
pub use price::{format_price, line_total};
