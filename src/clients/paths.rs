//! Collection layout of the store.

use crate::framework::CollectionPath;
use crate::session::OwnerId;

/// `user/{owner}/cart`: the owner's cart lines.
pub fn cart(owner: &OwnerId) -> CollectionPath {
    CollectionPath::new(format!("user/{owner}/cart"))
}

/// `user/{owner}/orders`: the owner's private order history.
pub fn order_history(owner: &OwnerId) -> CollectionPath {
    CollectionPath::new(format!("user/{owner}/orders"))
}

/// `user/{owner}/address`: the owner's saved shipping addresses.
pub fn addresses(owner: &OwnerId) -> CollectionPath {
    CollectionPath::new(format!("user/{owner}/address"))
}

/// `orders`: the global order ledger.
pub fn order_ledger() -> CollectionPath {
    CollectionPath::new("orders")
}

/// `products`: the catalog.
pub fn products() -> CollectionPath {
    CollectionPath::new("products")
}
