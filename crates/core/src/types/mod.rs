//! Core types for the cart.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod id;
pub mod line_item;
pub mod price;
pub mod product;

pub use id::*;
pub use line_item::CartLineItem;
pub use price::amount_from_json;
pub use product::{CatalogProduct, ProductDefaults};
