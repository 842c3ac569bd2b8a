//! Sepet Core - Cart domain types and persistence codec.
//!
//! This crate provides the pieces of the storefront cart that have no I/O:
//! - line items and the catalog product input they are built from
//! - the composite identity key that distinguishes line items
//! - the wire codec used to persist a cart snapshot
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no storage
//! access. Persistence tiers and the cart service live in `sepet-cart`.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, price parsing, product input and line items
//! - [`identity`] - `cartItemId` derivation
//! - [`codec`] - Compact/legacy snapshot encoding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod identity;
pub mod types;

pub use codec::{CartCodec, CodecError, CompactCodec, SchemaVersion, detect_schema};
pub use identity::compute_key;
pub use types::*;
