//! # Cart
//!
//! Live, multi-writer shopping cart kept in sync with the owner's cart collection.
//!
//! - [`RemoteCollectionSync`] turns the store subscription into a tagged-state stream.
//! - [`LineMutationTransactor`] changes one line's quantity with compare-and-set.
//! - [`UpsertResolver`] decides between inserting a new line and incrementing an existing one.
//! - [`PriceAggregator`] derives the cart total from each snapshot.
//! - [`CartManager`] wires them together behind fire-and-forget triggers.

pub mod error;
pub mod manager;
pub mod price;
pub mod sync;
pub mod transactor;
pub mod upsert;

pub use error::CartError;
pub use manager::CartManager;
pub use price::PriceAggregator;
pub use sync::{RemoteCollectionSync, SnapshotStream};
pub use transactor::{LineMutationTransactor, MutationOutcome, QuantityChange};
pub use upsert::{UpsertOutcome, UpsertResolver};
