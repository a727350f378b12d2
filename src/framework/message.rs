//! # Store Messages
//!
//! This module defines the request type sent from a `StoreClient` to a `CollectionActor`.

use crate::framework::document::{
    BatchReceipt, CollectionPath, Document, DocumentId, Listing, Query, SnapshotReceiver,
    StoreStats, Stored, Write,
};
use crate::framework::error::StoreError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Message type sent to the store actor.
///
/// # Document-Store Operations
/// The variants follow the operations a remote key-document store offers:
///
/// - **Insert / Get / Set / Delete**: single-document CRUD. `Insert` assigns a fresh id.
/// - **List**: filtered, limited read of one collection, returning the collection version.
/// - **CompareAndSet**: conditional write (or delete, when `document` is `None`) that only
///   commits if the document still carries `expected` as its version. This is the building
///   block of [`StoreClient::transact`](crate::framework::StoreClient::transact).
/// - **Batch**: several writes committed atomically, optionally guarded by the version of
///   the whole collection.
/// - **Subscribe**: live view of a collection; every commit pushes a new snapshot.
/// - **Stats**: counters for diagnostics.
#[derive(Debug)]
pub enum StoreRequest<T: Document> {
    Insert {
        path: CollectionPath,
        document: T,
        respond_to: Response<DocumentId>,
    },
    Get {
        path: CollectionPath,
        id: DocumentId,
        respond_to: Response<Option<Stored<T>>>,
    },
    Set {
        path: CollectionPath,
        id: DocumentId,
        document: T,
        respond_to: Response<u64>,
    },
    Delete {
        path: CollectionPath,
        id: DocumentId,
        respond_to: Response<()>,
    },
    List {
        path: CollectionPath,
        query: Query<T>,
        respond_to: Response<Listing<T>>,
    },
    CompareAndSet {
        path: CollectionPath,
        id: DocumentId,
        expected: u64,
        document: Option<T>,
        respond_to: Response<u64>,
    },
    Batch {
        path: CollectionPath,
        expected: Option<u64>,
        writes: Vec<Write<T>>,
        respond_to: Response<BatchReceipt>,
    },
    Subscribe {
        path: CollectionPath,
        respond_to: Response<SnapshotReceiver<T>>,
    },
    Stats {
        respond_to: Response<StoreStats>,
    },
}
