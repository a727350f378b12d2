//! Order store: keeps both each owner's private history and the global ledger.

pub mod document;
pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::framework::CollectionActor;
use crate::model::Order;

/// Creates a new order store actor and its client.
pub fn new(buffer_size: usize) -> (CollectionActor<Order>, OrderClient) {
    let (actor, generic_client) = CollectionActor::new(buffer_size);
    (actor, OrderClient::new(generic_client))
}
