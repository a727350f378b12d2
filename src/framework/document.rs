//! # Document Trait & Store Vocabulary
//!
//! The `Document` trait is the contract every stored type (cart lines, orders, products)
//! satisfies to be kept by a [`CollectionActor`](crate::framework::CollectionActor).
//! The remaining types describe how documents are addressed (`CollectionPath`,
//! `DocumentId`), how they come back (`Stored`, `Listing`, snapshots) and how several
//! writes travel together (`Write`, `BatchReceipt`).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Trait that any stored type must implement to be managed by a `CollectionActor`.
///
/// # Validation Hook
/// [`Document::validate`] runs inside the actor before every commit that carries the
/// document (insert, set, compare-and-set, batch). A failing validation rejects the whole
/// request and the collection is left untouched.
///
/// The default implementation accepts everything.
pub trait Document: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// The error type reported by [`Document::validate`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Check the document's invariants before it is written.
    fn validate(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Opaque identifier of a document inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generates a fresh random identifier, the way the store assigns ids on insert.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Slash-separated location of a collection, e.g. `user/alice/cart`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document together with its id and the collection version of its last write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: DocumentId,
    pub version: u64,
    pub data: T,
}

/// Result of a list query: the matching documents in insertion order, plus the version
/// of the whole collection at the moment the query ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub documents: Vec<Stored<T>>,
    pub version: u64,
}

impl<T> Listing<T> {
    pub fn into_data(self) -> Vec<T> {
        self.documents.into_iter().map(|doc| doc.data).collect()
    }
}

/// Full contents of one collection, as pushed to live subscribers.
pub type CollectionSnapshot<T> = Arc<Vec<Stored<T>>>;

/// Receiving half of a live subscription. Dropping it releases the listener.
pub type SnapshotReceiver<T> = watch::Receiver<CollectionSnapshot<T>>;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Filter and limit applied by a list request.
pub struct Query<T> {
    filter: Option<Predicate<T>>,
    limit: Option<usize>,
}

impl<T> Query<T> {
    /// Matches every document.
    pub fn all() -> Self {
        Self {
            filter: None,
            limit: None,
        }
    }

    /// Keep only documents for which `predicate` returns true.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(predicate));
        self
    }

    /// Return at most `limit` documents, counted in insertion order.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, document: &T) -> bool {
        self.filter.as_ref().map_or(true, |predicate| predicate(document))
    }

    pub fn max_results(&self) -> usize {
        self.limit.unwrap_or(usize::MAX)
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            limit: self.limit,
        }
    }
}

impl<T> Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filtered", &self.filter.is_some())
            .field("limit", &self.limit)
            .finish()
    }
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Write<T> {
    Insert(T),
    Set(DocumentId, T),
    Delete(DocumentId),
}

/// Acknowledgement of a committed batch.
///
/// `ids` lists the document touched by each write, in the order the writes were given.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReceipt {
    pub version: u64,
    pub ids: Vec<DocumentId>,
}

/// Counters reported by the store, mostly useful for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub collections: usize,
    pub documents: usize,
    pub listeners: usize,
}
