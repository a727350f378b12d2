//! # Generic Store Client
//!
//! This module defines the client half of the document store, including the optimistic
//! read-modify-write helper [`StoreClient::transact`].

use crate::framework::document::{
    BatchReceipt, CollectionPath, Document, DocumentId, Listing, Query, SnapshotReceiver,
    StoreStats, Stored, Write,
};
use crate::framework::error::StoreError;
use crate::framework::message::StoreRequest;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// What a transaction body decided to do with the document it read.
///
/// The second field is handed back to the caller once the decision has committed.
#[derive(Debug, Clone, PartialEq)]
pub enum TxDecision<T, R> {
    /// Replace the document with a new value.
    Write(T, R),
    /// Delete the document.
    Delete(R),
    /// Leave the document untouched.
    Abort(R),
}

/// A type-safe client for interacting with a `CollectionActor`.
///
/// Holds only a sender, so cloning is inexpensive and clones can be moved into tasks.
pub struct StoreClient<T: Document> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: Document> Clone for StoreClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Document> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    async fn call<R>(
        &self,
        request: impl FnOnce(oneshot::Sender<Result<R, StoreError>>) -> StoreRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn insert(&self, path: CollectionPath, document: T) -> Result<DocumentId, StoreError> {
        self.call(|respond_to| StoreRequest::Insert {
            path,
            document,
            respond_to,
        })
        .await
    }

    pub async fn get(
        &self,
        path: CollectionPath,
        id: DocumentId,
    ) -> Result<Option<Stored<T>>, StoreError> {
        self.call(|respond_to| StoreRequest::Get {
            path,
            id,
            respond_to,
        })
        .await
    }

    pub async fn set(
        &self,
        path: CollectionPath,
        id: DocumentId,
        document: T,
    ) -> Result<u64, StoreError> {
        self.call(|respond_to| StoreRequest::Set {
            path,
            id,
            document,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, path: CollectionPath, id: DocumentId) -> Result<(), StoreError> {
        self.call(|respond_to| StoreRequest::Delete {
            path,
            id,
            respond_to,
        })
        .await
    }

    pub async fn list(&self, path: CollectionPath, query: Query<T>) -> Result<Listing<T>, StoreError> {
        self.call(|respond_to| StoreRequest::List {
            path,
            query,
            respond_to,
        })
        .await
    }

    /// Writes (or deletes, when `document` is `None`) only if the stored document still
    /// carries version `expected`.
    pub async fn compare_and_set(
        &self,
        path: CollectionPath,
        id: DocumentId,
        expected: u64,
        document: Option<T>,
    ) -> Result<u64, StoreError> {
        self.call(|respond_to| StoreRequest::CompareAndSet {
            path,
            id,
            expected,
            document,
            respond_to,
        })
        .await
    }

    /// Commits all `writes` at once. With `expected` set, the batch only commits if the
    /// collection version has not moved.
    pub async fn batch(
        &self,
        path: CollectionPath,
        expected: Option<u64>,
        writes: Vec<Write<T>>,
    ) -> Result<BatchReceipt, StoreError> {
        self.call(|respond_to| StoreRequest::Batch {
            path,
            expected,
            writes,
            respond_to,
        })
        .await
    }

    pub async fn subscribe(&self, path: CollectionPath) -> Result<SnapshotReceiver<T>, StoreError> {
        self.call(|respond_to| StoreRequest::Subscribe { path, respond_to })
            .await
    }

    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.call(|respond_to| StoreRequest::Stats { respond_to })
            .await
    }

    /// Optimistic read-modify-write of a single document.
    ///
    /// Reads the document, hands it to `decide`, and commits the decision with
    /// compare-and-set. When another commit slipped in between, the whole cycle is re-run
    /// against the fresh document, up to `max_attempts` times.
    ///
    /// Returns `Ok(None)` if the document does not exist (or disappeared mid-way), and
    /// [`StoreError::Contention`] once the attempts are exhausted.
    pub async fn transact<R>(
        &self,
        path: CollectionPath,
        id: DocumentId,
        max_attempts: u32,
        mut decide: impl FnMut(&T) -> TxDecision<T, R> + Send,
    ) -> Result<Option<R>, StoreError> {
        for attempt in 1..=max_attempts.max(1) {
            let Some(current) = self.get(path.clone(), id.clone()).await? else {
                return Ok(None);
            };

            let (document, outcome) = match decide(&current.data) {
                TxDecision::Abort(outcome) => return Ok(Some(outcome)),
                TxDecision::Write(document, outcome) => (Some(document), outcome),
                TxDecision::Delete(outcome) => (None, outcome),
            };

            match self
                .compare_and_set(path.clone(), id.clone(), current.version, document)
                .await
            {
                Ok(_) => return Ok(Some(outcome)),
                Err(StoreError::NotFound(_)) => return Ok(None),
                Err(e) if e.is_conflict() => {
                    debug!(%path, %id, attempt, "Transaction conflict, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Err(StoreError::Contention(max_attempts.max(1)))
    }
}
