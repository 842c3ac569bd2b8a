//! Cart commands.
//!
//! Each invocation is one storefront "session": the durable primary store is a
//! JSON file in the data directory, and the session-scoped secondary store
//! lives only for the duration of the command.

use std::path::PathBuf;
use std::sync::Arc;

use rust_decimal::Decimal;
use sepet_cart::{CartConfig, CartService, FileBackend, MemoryBackend};
use sepet_core::{CartItemId, CatalogProduct};

use super::CliError;

const DEFAULT_DATA_DIR: &str = ".sepet";
const STORAGE_FILE: &str = "local_storage.json";

/// Open the cart stored under `data_dir` (or `SEPET_DATA_DIR`, or `.sepet`).
///
/// # Errors
///
/// Returns `CliError::Config` if the cart configuration is invalid.
pub fn open(data_dir: Option<PathBuf>) -> Result<CartService, CliError> {
    let config = CartConfig::from_env()?;
    let data_dir = data_dir
        .or_else(|| std::env::var_os("SEPET_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    tracing::debug!(data_dir = %data_dir.display(), "opening cart storage");
    let primary = Arc::new(FileBackend::new(
        data_dir.join(STORAGE_FILE),
        config.storage_quota_bytes,
    ));
    let secondary = Arc::new(MemoryBackend::new());

    Ok(CartService::from_config(primary, secondary, &config))
}

/// Build a product from a catalog JSON document.
#[must_use]
pub fn product_from_json(json: &str) -> CatalogProduct {
    CatalogProduct::from_json(json)
}

/// Build a product from individual flags.
///
/// # Errors
///
/// Returns `CliError::MissingProduct` if no ID was given.
pub fn product_from_flags(
    id: Option<String>,
    name: Option<String>,
    price: Option<Decimal>,
    image: Option<String>,
) -> Result<CatalogProduct, CliError> {
    let mut product = CatalogProduct::new(id.ok_or(CliError::MissingProduct)?);
    if let Some(name) = name {
        product = product.with_name(name);
    }
    if let Some(price) = price {
        product = product.with_price(price);
    }
    if let Some(image) = image {
        product = product.with_image(image);
    }
    Ok(product)
}

pub fn add(
    cart: &mut CartService,
    product: &CatalogProduct,
    size: Option<&str>,
    color: Option<&str>,
    qty: u32,
) {
    match cart.add_item(product, size, color, qty) {
        Some(id) => tracing::info!("Added {qty} x {id}"),
        None => tracing::warn!("Nothing added"),
    }
}

pub fn remove(cart: &mut CartService, cart_item_id: &str) {
    let id = CartItemId::new(cart_item_id);
    if cart.get(&id).is_none() {
        tracing::warn!("No line {id} in cart");
    }
    cart.remove_item(&id);
}

pub fn update(cart: &mut CartService, cart_item_id: &str, qty: i64) {
    let id = CartItemId::new(cart_item_id);
    if cart.get(&id).is_none() {
        tracing::warn!("No line {id} in cart");
    }
    cart.update_quantity(&id, qty);
}

/// Render the cart as plain text.
#[must_use]
pub fn render(cart: &CartService) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for line in cart.items() {
        let _ = writeln!(
            out,
            "{}  {}  {} x {} = {}",
            line.cart_item_id,
            line.name,
            line.quantity,
            line.unit_price,
            line.line_total()
        );
    }
    let _ = write!(
        out,
        "items: {}  total: {}  storage: {}",
        cart.count(),
        cart.total(),
        cart.tier()
    );
    out
}

#[allow(clippy::print_stdout)]
pub fn show(cart: &CartService) {
    println!("{}", render(cart));
}
