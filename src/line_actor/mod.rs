//! Cart-line store: validation rules for cart lines and the factory for their store.

pub mod document;
pub mod error;

pub use error::*;

use crate::clients::LineClient;
use crate::framework::CollectionActor;
use crate::model::Line;

/// Creates a new cart-line store actor and its client.
pub fn new(buffer_size: usize) -> (CollectionActor<Line>, LineClient) {
    let (actor, generic_client) = CollectionActor::new(buffer_size);
    (actor, LineClient::new(generic_client))
}
