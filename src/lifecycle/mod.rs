//! # System Lifecycle & Orchestration
//!
//! Starting the four stores, building the components that talk to them, and shutting
//! everything down again.
//!
//! ## The ShopSystem Pattern
//!
//! ```rust,ignore
//! let system = ShopSystem::with_config(ShopConfig::load("shop.toml")?);
//! let session = Session::signed_in("alice");
//!
//! let cart = system.cart(&session)?;
//! let checkout = system.checkout(&cart);
//! let feed = system.product_feed();
//!
//! // ... use them ...
//!
//! drop((cart, checkout, feed));
//! system.shutdown().await?;
//! ```
//!
//! ## Graceful Shutdown
//!
//! A store stops once every client of it is gone:
//!
//! 1. **Drop the components** - carts, checkouts, address books and feeds hold clients
//! 2. **Drop the system clients** - `shutdown` does this
//! 3. **Stores detect closure** - `receiver.recv()` returns `None`
//! 4. **Await completion** - `shutdown` waits for every store task
//!
//! A live cart subscription does not hold a client, only a listener; when its store stops
//! the cart channel reports `Error("remote listener closed")`.

pub mod config;
pub mod shop_system;
pub mod tracing;

pub use config::{ConfigError, ShopConfig};
pub use shop_system::ShopSystem;
pub use self::tracing::setup_tracing;
