//! # Generic Store Actor
//!
//! This module defines the `CollectionActor`, the server half of the document store.
//! It owns every collection of one document type, processes requests sequentially and
//! pushes a fresh snapshot to live subscribers after each commit.

use crate::framework::client::StoreClient;
use crate::framework::document::{
    BatchReceipt, CollectionPath, CollectionSnapshot, Document, DocumentId, Listing, Query,
    SnapshotReceiver, StoreStats, Stored, Write,
};
use crate::framework::error::StoreError;
use crate::framework::message::StoreRequest;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

struct Collection<T> {
    version: u64,
    documents: IndexMap<DocumentId, Stored<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            version: 0,
            documents: IndexMap::new(),
        }
    }
}

impl<T: Clone> Collection<T> {
    fn snapshot(&self) -> CollectionSnapshot<T> {
        Arc::new(self.documents.values().cloned().collect())
    }
}

/// The generic actor that stores documents of type `T`, grouped by collection path.
///
/// # Architecture Note
/// This struct is the "Server" half of the store. It owns the collections and the
/// receiver end of the channel, so no `Mutex` guards the data: every request runs to
/// completion before the next one is looked at. That sequential processing is what makes
/// compare-and-set and batches atomic.
///
/// # Versions
/// Each collection carries a version counter that is bumped once per commit. A written
/// document records the version of the commit that wrote it. Document versions drive
/// [`StoreRequest::CompareAndSet`]; the collection version drives guarded batches.
///
/// # Live Subscriptions
/// Subscribers of a path share one `watch` channel. After a commit the actor replaces the
/// channel's value with the full collection. Once every receiver is gone the channel is
/// pruned and the listener counts as released.
///
/// # Usage Pattern
///
/// ```rust,ignore
/// let (actor, client) = CollectionActor::<Line>::new(32);
/// tokio::spawn(actor.run());
/// let id = client.insert(CollectionPath::new("user/alice/cart"), line).await?;
/// ```
pub struct CollectionActor<T: Document> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    collections: HashMap<CollectionPath, Collection<T>>,
    listeners: HashMap<CollectionPath, watch::Sender<CollectionSnapshot<T>>>,
}

impl<T: Document> CollectionActor<T> {
    /// Creates a new `CollectionActor` and its associated `StoreClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space. Zero is treated as one.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let actor = Self {
            receiver,
            collections: HashMap::new(),
            listeners: HashMap::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(mut self) {
        // Extract just the type name (e.g., "Line" instead of "cart_sync::model::line::Line")
        let document_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(document_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert {
                    path,
                    document,
                    respond_to,
                } => {
                    debug!(document_type, %path, "Insert");
                    let result = self.insert(&path, document);
                    match &result {
                        Ok(id) => info!(document_type, %path, %id, "Inserted"),
                        Err(e) => warn!(document_type, %path, error = %e, "Insert failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Get {
                    path,
                    id,
                    respond_to,
                } => {
                    let item = self
                        .collections
                        .get(&path)
                        .and_then(|collection| collection.documents.get(&id))
                        .cloned();
                    debug!(document_type, %path, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::Set {
                    path,
                    id,
                    document,
                    respond_to,
                } => {
                    debug!(document_type, %path, %id, "Set");
                    let result = self.set(&path, id.clone(), document);
                    match &result {
                        Ok(version) => info!(document_type, %path, %id, version, "Set"),
                        Err(e) => warn!(document_type, %path, %id, error = %e, "Set failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Delete {
                    path,
                    id,
                    respond_to,
                } => {
                    debug!(document_type, %path, %id, "Delete");
                    let result = self.delete(&path, &id);
                    match &result {
                        Ok(()) => info!(document_type, %path, %id, "Deleted"),
                        Err(e) => warn!(document_type, %path, %id, error = %e, "Delete failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::List {
                    path,
                    query,
                    respond_to,
                } => {
                    let listing = self.list(&path, &query);
                    debug!(
                        document_type,
                        %path,
                        ?query,
                        matched = listing.documents.len(),
                        version = listing.version,
                        "List"
                    );
                    let _ = respond_to.send(Ok(listing));
                }
                StoreRequest::CompareAndSet {
                    path,
                    id,
                    expected,
                    document,
                    respond_to,
                } => {
                    debug!(document_type, %path, %id, expected, delete = document.is_none(), "CompareAndSet");
                    let result = self.compare_and_set(&path, &id, expected, document);
                    match &result {
                        Ok(version) => info!(document_type, %path, %id, version, "Committed"),
                        Err(e) if e.is_conflict() => {
                            debug!(document_type, %path, %id, error = %e, "Conflict")
                        }
                        Err(e) => warn!(document_type, %path, %id, error = %e, "CompareAndSet failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Batch {
                    path,
                    expected,
                    writes,
                    respond_to,
                } => {
                    debug!(document_type, %path, ?expected, writes = writes.len(), "Batch");
                    let result = self.batch(&path, expected, writes);
                    match &result {
                        Ok(receipt) => info!(
                            document_type,
                            %path,
                            version = receipt.version,
                            writes = receipt.ids.len(),
                            "Batch committed"
                        ),
                        Err(e) if e.is_conflict() => {
                            debug!(document_type, %path, error = %e, "Batch conflict")
                        }
                        Err(e) => warn!(document_type, %path, error = %e, "Batch failed"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Subscribe { path, respond_to } => {
                    let receiver = self.subscribe(&path);
                    info!(document_type, %path, listeners = self.listeners.len(), "Subscribed");
                    let _ = respond_to.send(Ok(receiver));
                }
                StoreRequest::Stats { respond_to } => {
                    let _ = respond_to.send(Ok(self.stats()));
                }
            }
        }

        info!(
            document_type,
            collections = self.collections.len(),
            "Shutdown"
        );
    }

    fn insert(&mut self, path: &CollectionPath, document: T) -> Result<DocumentId, StoreError> {
        validate(&document)?;
        let id = DocumentId::generate();
        let collection = self.collections.entry(path.clone()).or_default();
        collection.version += 1;
        let version = collection.version;
        collection.documents.insert(
            id.clone(),
            Stored {
                id: id.clone(),
                version,
                data: document,
            },
        );
        self.publish(path);
        Ok(id)
    }

    fn set(&mut self, path: &CollectionPath, id: DocumentId, document: T) -> Result<u64, StoreError> {
        validate(&document)?;
        let collection = self.collections.entry(path.clone()).or_default();
        collection.version += 1;
        let version = collection.version;
        collection.documents.insert(
            id.clone(),
            Stored {
                id,
                version,
                data: document,
            },
        );
        self.publish(path);
        Ok(version)
    }

    fn delete(&mut self, path: &CollectionPath, id: &DocumentId) -> Result<(), StoreError> {
        let collection = self
            .collections
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(format!("{path}/{id}")))?;
        // shift_remove keeps the remaining documents in insertion order
        if collection.documents.shift_remove(id).is_none() {
            return Err(StoreError::NotFound(format!("{path}/{id}")));
        }
        collection.version += 1;
        self.publish(path);
        Ok(())
    }

    fn list(&self, path: &CollectionPath, query: &Query<T>) -> Listing<T> {
        match self.collections.get(path) {
            Some(collection) => Listing {
                documents: collection
                    .documents
                    .values()
                    .filter(|doc| query.matches(&doc.data))
                    .take(query.max_results())
                    .cloned()
                    .collect(),
                version: collection.version,
            },
            None => Listing {
                documents: Vec::new(),
                version: 0,
            },
        }
    }

    fn compare_and_set(
        &mut self,
        path: &CollectionPath,
        id: &DocumentId,
        expected: u64,
        document: Option<T>,
    ) -> Result<u64, StoreError> {
        if let Some(document) = &document {
            validate(document)?;
        }
        let collection = self
            .collections
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(format!("{path}/{id}")))?;
        let current = collection
            .documents
            .get(id)
            .ok_or_else(|| StoreError::NotFound(format!("{path}/{id}")))?;
        if current.version != expected {
            return Err(StoreError::VersionConflict {
                target: format!("{path}/{id}"),
                expected,
                actual: current.version,
            });
        }

        collection.version += 1;
        let version = collection.version;
        match document {
            Some(data) => {
                collection.documents.insert(
                    id.clone(),
                    Stored {
                        id: id.clone(),
                        version,
                        data,
                    },
                );
            }
            None => {
                collection.documents.shift_remove(id);
            }
        }
        self.publish(path);
        Ok(version)
    }

    fn batch(
        &mut self,
        path: &CollectionPath,
        expected: Option<u64>,
        writes: Vec<Write<T>>,
    ) -> Result<BatchReceipt, StoreError> {
        for write in &writes {
            if let Write::Insert(document) | Write::Set(_, document) = write {
                validate(document)?;
            }
        }

        let collection = self.collections.entry(path.clone()).or_default();
        if let Some(expected) = expected {
            if collection.version != expected {
                return Err(StoreError::VersionConflict {
                    target: path.to_string(),
                    expected,
                    actual: collection.version,
                });
            }
        }
        if writes.is_empty() {
            return Ok(BatchReceipt {
                version: collection.version,
                ids: Vec::new(),
            });
        }

        collection.version += 1;
        let version = collection.version;
        let mut ids = Vec::with_capacity(writes.len());
        for write in writes {
            match write {
                Write::Insert(data) => {
                    let id = DocumentId::generate();
                    collection.documents.insert(
                        id.clone(),
                        Stored {
                            id: id.clone(),
                            version,
                            data,
                        },
                    );
                    ids.push(id);
                }
                Write::Set(id, data) => {
                    collection.documents.insert(
                        id.clone(),
                        Stored {
                            id: id.clone(),
                            version,
                            data,
                        },
                    );
                    ids.push(id);
                }
                Write::Delete(id) => {
                    // Deleting a document that is already gone is not an error inside a batch
                    collection.documents.shift_remove(&id);
                    ids.push(id);
                }
            }
        }
        self.publish(path);
        Ok(BatchReceipt { version, ids })
    }

    fn subscribe(&mut self, path: &CollectionPath) -> SnapshotReceiver<T> {
        let snapshot = self
            .collections
            .get(path)
            .map(Collection::snapshot)
            .unwrap_or_default();
        match self.listeners.get(path) {
            Some(sender) if !sender.is_closed() => sender.subscribe(),
            _ => {
                let (sender, receiver) = watch::channel(snapshot);
                self.listeners.insert(path.clone(), sender);
                receiver
            }
        }
    }

    fn publish(&mut self, path: &CollectionPath) {
        let Some(sender) = self.listeners.get(path) else {
            return;
        };
        if sender.is_closed() {
            self.listeners.remove(path);
            debug!(%path, "Listener released");
            return;
        }
        if let Some(collection) = self.collections.get(path) {
            sender.send_replace(collection.snapshot());
        }
    }

    fn stats(&mut self) -> StoreStats {
        self.listeners.retain(|path, sender| {
            let open = !sender.is_closed();
            if !open {
                debug!(%path, "Listener released");
            }
            open
        });
        StoreStats {
            collections: self.collections.len(),
            documents: self
                .collections
                .values()
                .map(|collection| collection.documents.len())
                .sum(),
            listeners: self
                .listeners
                .values()
                .map(|sender| sender.receiver_count())
                .sum(),
        }
    }
}

fn validate<T: Document>(document: &T) -> Result<(), StoreError> {
    document
        .validate()
        .map_err(|e| StoreError::Rejected(Box::new(e)))
}
