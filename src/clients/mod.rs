//! Type-safe wrappers around [`StoreClient`](crate::framework::StoreClient).

pub mod address_client;
pub mod line_client;
pub mod order_client;
pub mod paths;
pub mod product_client;

pub use address_client::*;
pub use line_client::*;
pub use order_client::*;
pub use product_client::*;
