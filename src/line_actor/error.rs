//! Error types for the cart-line store.

use thiserror::Error;

/// Errors that can occur during cart-line operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LineError {
    /// The requested line was not found.
    #[error("Cart line not found: {0}")]
    NotFound(String),

    /// A stored line must hold at least one unit.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// The cart changed between the read and the conditional write.
    #[error("Cart changed concurrently: {0}")]
    Conflict(String),

    /// A transaction kept losing against concurrent writers.
    #[error("Cart line contention: {0}")]
    Contention(String),

    /// An error occurred while communicating with the store.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for LineError {
    fn from(msg: String) -> Self {
        LineError::ActorCommunicationError(msg)
    }
}
