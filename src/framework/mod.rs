//! Generic document-store actor framework.
//!
//! This module provides the building blocks for a type-safe, actor-backed document store
//! that behaves like a remote key-document service: per-path collections, versioned
//! documents, compare-and-set, batched writes and live subscriptions.
//!
//! # Main Components
//!
//! - [`Document`] - Trait that stored types implement
//! - [`CollectionActor`] - Generic actor that owns every collection of one document type
//! - [`StoreClient`] - Type-safe, cloneable handle used to talk to the actor
//! - [`CollectionClient`] - Trait that domain clients implement to inherit common reads
//! - [`StoreError`] - Errors produced by the store itself
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning a store actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod document;
pub mod error;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::CollectionActor;
pub use client::{StoreClient, TxDecision};
pub use client_trait::CollectionClient;
pub use document::{
    BatchReceipt, CollectionPath, CollectionSnapshot, Document, DocumentId, Listing, Query,
    SnapshotReceiver, StoreStats, Stored, Write,
};
pub use error::StoreError;
pub use message::{Response, StoreRequest};
