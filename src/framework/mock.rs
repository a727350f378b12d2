//! # Mock Store & Testing Guide
//!
//! `MockClient<T>` hands out a real [`StoreClient<T>`] whose requests are answered from a
//! queue of expectations instead of a `CollectionActor`. It lets tests inject failures that
//! are hard to provoke against a live store (a closed store, a rejected batch, a listener
//! that never starts).
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler |
//! | **State** | No real state (expectations) | Real collections and versions |
//! | **Use Case** | Error paths of cart and checkout logic | Concurrency, listeners, full flows |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Testing Failure Scenarios
//!
//! ```rust,ignore
//! let mut mock = MockClient::<Line>::new();
//! mock.expect_subscribe().return_err(StoreError::ActorClosed);
//!
//! let lines = LineClient::new(mock.client());
//! let result = lines.subscribe(&owner).await;
//! assert!(result.is_err());
//! mock.verify();
//! ```
//!
//! Expectations are consumed in order. A request that does not match the next expectation
//! panics the responder task, which the caller observes as [`StoreError::ActorDropped`].
//!
//! For full control over each request, [`create_mock_client`] returns the raw receiver
//! and [`next_request`] pulls from it.

use crate::framework::client::StoreClient;
use crate::framework::document::{
    BatchReceipt, Document, DocumentId, Listing, SnapshotReceiver, Stored,
};
use crate::framework::error::StoreError;
use crate::framework::message::StoreRequest;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the response the mock will give to it.
enum Expectation<T: Document> {
    Insert(Result<DocumentId, StoreError>),
    Get(Result<Option<Stored<T>>, StoreError>),
    Set(Result<u64, StoreError>),
    Delete(Result<(), StoreError>),
    List(Result<Listing<T>, StoreError>),
    CompareAndSet(Result<u64, StoreError>),
    Batch(Result<BatchReceipt, StoreError>),
    Subscribe(Result<SnapshotReceiver<T>, StoreError>),
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock<T: Document>(expectations: &Expectations<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    expectations.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A mock store with expectation tracking for fluent testing.
pub struct MockClient<T: Document> {
    client: StoreClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: Document> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> MockClient<T> {
    /// Creates a new mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        // Spawn background task to answer requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&queue).pop_front();

                match (request, expectation) {
                    (StoreRequest::Insert { respond_to, .. }, Some(Expectation::Insert(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Get { respond_to, .. }, Some(Expectation::Get(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Set { respond_to, .. }, Some(Expectation::Set(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Delete { respond_to, .. }, Some(Expectation::Delete(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::List { respond_to, .. }, Some(Expectation::List(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (
                        StoreRequest::CompareAndSet { respond_to, .. },
                        Some(Expectation::CompareAndSet(r)),
                    ) => {
                        let _ = respond_to.send(r);
                    }
                    (StoreRequest::Batch { respond_to, .. }, Some(Expectation::Batch(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (
                        StoreRequest::Subscribe { respond_to, .. },
                        Some(Expectation::Subscribe(r)),
                    ) => {
                        let _ = respond_to.send(r);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> StoreClient<T> {
        self.client.clone()
    }

    fn expect<R>(&mut self, wrap: fn(Result<R, StoreError>) -> Expectation<T>) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            wrap,
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_insert(&mut self) -> ExpectationBuilder<T, DocumentId> {
        self.expect(Expectation::Insert)
    }

    pub fn expect_get(&mut self) -> ExpectationBuilder<T, Option<Stored<T>>> {
        self.expect(Expectation::Get)
    }

    pub fn expect_set(&mut self) -> ExpectationBuilder<T, u64> {
        self.expect(Expectation::Set)
    }

    pub fn expect_delete(&mut self) -> ExpectationBuilder<T, ()> {
        self.expect(Expectation::Delete)
    }

    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Listing<T>> {
        self.expect(Expectation::List)
    }

    pub fn expect_compare_and_set(&mut self) -> ExpectationBuilder<T, u64> {
        self.expect(Expectation::CompareAndSet)
    }

    pub fn expect_batch(&mut self) -> ExpectationBuilder<T, BatchReceipt> {
        self.expect(Expectation::Batch)
    }

    pub fn expect_subscribe(&mut self) -> ExpectationBuilder<T, SnapshotReceiver<T>> {
        self.expect(Expectation::Subscribe)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// Builder that queues the response for one expected request.
pub struct ExpectationBuilder<T: Document, R> {
    wrap: fn(Result<R, StoreError>) -> Expectation<T>,
    expectations: Expectations<T>,
}

impl<T: Document, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        lock(&self.expectations).push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        lock(&self.expectations).push_back((self.wrap)(Err(error)));
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a client and the receiver its requests land on.
///
/// Tests that need to inspect request payloads (paths, writes, expected versions) answer
/// each request by hand through its `respond_to` channel.
pub fn create_mock_client<T: Document>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size.max(1));
    (StoreClient::new(sender), receiver)
}

/// Waits for the next request sent through a client from [`create_mock_client`].
pub async fn next_request<T: Document>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<StoreRequest<T>> {
    receiver.recv().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::CollectionPath;

    #[derive(Debug, Clone, PartialEq)]
    struct Note(String);

    impl Document for Note {
        type Error = std::convert::Infallible;
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Note>::new();
        mock.expect_insert().return_ok(DocumentId::from("n1"));
        mock.expect_get().return_ok(Some(Stored {
            id: DocumentId::from("n1"),
            version: 1,
            data: Note("hello".to_string()),
        }));
        mock.expect_delete().return_err(StoreError::ActorClosed);

        let client = mock.client();
        let path = CollectionPath::new("notes");

        let id = client.insert(path.clone(), Note("hello".to_string())).await.unwrap();
        assert_eq!(id, DocumentId::from("n1"));

        let fetched = client.get(path.clone(), id.clone()).await.unwrap().unwrap();
        assert_eq!(fetched.data.0, "hello");

        let deleted = client.delete(path, id).await;
        assert!(matches!(deleted, Err(StoreError::ActorClosed)));

        mock.verify();
    }

    #[tokio::test]
    async fn test_raw_channel_exposes_payload() {
        let (client, mut receiver) = create_mock_client::<Note>(4);

        let task = tokio::spawn(async move {
            client
                .insert(CollectionPath::new("notes"), Note("raw".to_string()))
                .await
        });

        match next_request(&mut receiver).await {
            Some(StoreRequest::Insert {
                path,
                document,
                respond_to,
            }) => {
                assert_eq!(path.as_str(), "notes");
                assert_eq!(document.0, "raw");
                respond_to.send(Ok(DocumentId::from("raw-1"))).unwrap();
            }
            other => panic!("Expected Insert request, got {other:?}"),
        }

        let id = task.await.unwrap().unwrap();
        assert_eq!(id.as_str(), "raw-1");
    }
}
