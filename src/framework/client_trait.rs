//! # CollectionClient Trait
//!
//! Provides a common interface for domain-specific clients, adding default `get`,
//! `delete` and `list` methods built on top of a generic `StoreClient`.

use crate::framework::{
    CollectionPath, Document, DocumentId, Query, StoreClient, StoreError, StoreStats, Stored,
};
use async_trait::async_trait;

/// Trait for domain clients to inherit the standard document reads and deletes.
///
/// # Example
///
/// ```rust,ignore
/// struct NoteClient { inner: StoreClient<Note> }
///
/// #[async_trait]
/// impl CollectionClient<Note> for NoteClient {
///     type Error = NoteError;
///
///     fn inner(&self) -> &StoreClient<Note> { &self.inner }
///     fn map_error(e: StoreError) -> Self::Error { NoteError::from(e.to_string()) }
/// }
///
/// // get(), delete() and list() are provided automatically
/// let note = client.get(CollectionPath::new("notes"), id).await?;
/// ```
#[async_trait]
pub trait CollectionClient<T: Document>: Send + Sync {
    /// The domain-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic StoreClient.
    fn inner(&self) -> &StoreClient<T>;

    /// Map store errors to the domain error type.
    fn map_error(e: StoreError) -> Self::Error;

    /// Fetch a document by id.
    #[tracing::instrument(skip(self))]
    async fn get(&self, path: CollectionPath, id: DocumentId) -> Result<Option<Stored<T>>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(path, id).await.map_err(Self::map_error)
    }

    /// Delete a document by id.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, path: CollectionPath, id: DocumentId) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(path, id).await.map_err(Self::map_error)
    }

    /// Read every document of a collection, in insertion order.
    #[tracing::instrument(skip(self))]
    async fn list_all(&self, path: CollectionPath) -> Result<Vec<Stored<T>>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner()
            .list(path, Query::all())
            .await
            .map(|listing| listing.documents)
            .map_err(Self::map_error)
    }

    /// Store counters (collections, documents, live listeners).
    async fn stats(&self) -> Result<StoreStats, Self::Error> {
        self.inner().stats().await.map_err(Self::map_error)
    }
}
