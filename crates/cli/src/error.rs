//! CLI error type.

use maxfood_core::{CartError, PricingError, ProductId};
use maxfood_storefront::content::ContentError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Cart input was rejected.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// Shipping or pricing input was rejected.
    #[error("{0}")]
    Pricing(#[from] PricingError),

    /// Blog content could not be loaded.
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    /// No line with this product id.
    #[error("No item with id '{0}' in the cart")]
    NotInCart(ProductId),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}
