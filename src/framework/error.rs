//! # Store Errors
//!
//! This module defines the errors produced by the document store itself. Domain clients
//! translate them into their own error types through
//! [`CollectionClient::map_error`](crate::framework::CollectionClient::map_error).

/// Errors that can occur within the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store actor closed")]
    ActorClosed,
    #[error("Store actor dropped response channel")]
    ActorDropped,
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Version conflict on {target}: expected {expected}, found {actual}")]
    VersionConflict {
        target: String,
        expected: u64,
        actual: u64,
    },
    #[error("Transaction gave up after {0} attempts")]
    Contention(u32),
    #[error("Document rejected: {0}")]
    Rejected(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// True when a conditional write lost against a concurrent commit.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }

    /// Recovers the typed validation error a document raised, or gives `self` back.
    pub fn into_rejection<E: std::error::Error + 'static>(self) -> Result<E, StoreError> {
        match self {
            StoreError::Rejected(source) => source
                .downcast::<E>()
                .map(|error| *error)
                .map_err(StoreError::Rejected),
            other => Err(other),
        }
    }
}
