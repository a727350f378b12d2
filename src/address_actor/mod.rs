//! Address store: each owner's saved shipping addresses.

pub mod document;
pub mod error;

pub use error::*;

use crate::clients::AddressClient;
use crate::framework::CollectionActor;
use crate::model::Address;

/// Creates a new address store actor and its client.
pub fn new(buffer_size: usize) -> (CollectionActor<Address>, AddressClient) {
    let (actor, generic_client) = CollectionActor::new(buffer_size);
    (actor, AddressClient::new(generic_client))
}
