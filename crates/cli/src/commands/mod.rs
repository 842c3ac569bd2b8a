//! CLI command implementations.

pub mod cart;

use sepet_cart::ConfigError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Cart configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `add` was called without a product.
    #[error("A product needs --id or --json")]
    MissingProduct,
}
