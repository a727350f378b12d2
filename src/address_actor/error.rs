//! Error types for the address store.

use thiserror::Error;

/// Errors that can occur during address operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AddressError {
    /// A saved address needs every field filled in.
    #[error("Address is incomplete")]
    Incomplete,

    /// An error occurred while communicating with the store.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for AddressError {
    fn from(msg: String) -> Self {
        AddressError::ActorCommunicationError(msg)
    }
}
