//! Error types for cart operations.

use crate::line_actor::LineError;
use crate::session::SessionError;
use thiserror::Error;

/// Errors surfaced by the cart components.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// The cart was requested for a signed-out session.
    #[error(transparent)]
    NotSignedIn(#[from] SessionError),

    /// The cart store failed or rejected the request.
    #[error("Cart store failure: {0}")]
    Remote(#[from] LineError),
}

impl CartError {
    /// True for failures a caller may simply try again (store unavailable, contention).
    pub fn is_retriable(&self) -> bool {
        match self {
            CartError::NotSignedIn(_) => false,
            CartError::Remote(LineError::InvalidQuantity(_)) => false,
            CartError::Remote(_) => true,
        }
    }
}
