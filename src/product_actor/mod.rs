//! Product store: the catalog read by the product feed and referenced by cart lines.

pub mod document;
pub mod error;

pub use error::*;

use crate::clients::ProductClient;
use crate::framework::CollectionActor;
use crate::model::Product;

/// Creates a new product store actor and its client.
pub fn new(buffer_size: usize) -> (CollectionActor<Product>, ProductClient) {
    let (actor, generic_client) = CollectionActor::new(buffer_size);
    (actor, ProductClient::new(generic_client))
}
