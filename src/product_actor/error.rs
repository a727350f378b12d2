//! Error types for the product store.

use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// The requested product was not found.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Prices cannot be negative.
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    /// Discounts are fractions between 0 and 1.
    #[error("Invalid discount: {0}")]
    InvalidDiscount(f64),

    /// An error occurred while communicating with the store.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for ProductError {
    fn from(msg: String) -> Self {
        ProductError::ActorCommunicationError(msg)
    }
}
