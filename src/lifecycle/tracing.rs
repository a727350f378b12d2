//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing_subscriber` formatter filtered by
//! `RUST_LOG` (falling back to `info`).
//!
//! ## What Gets Traced
//!
//! - **Store lifecycle**: startup, shutdown, listener releases
//! - **Commits**: inserts, compare-and-set, batches, with collection path and version
//! - **Cart mutations**: spans per trigger carrying owner and line id
//! - **Checkout**: each placement with order id, and which steps failed
//!
//! ## Usage Examples
//!
//! ```bash
//! # Commits and outcomes
//! RUST_LOG=info cargo run
//!
//! # Every request, conflicts and retries included
//! RUST_LOG=debug cargo run
//!
//! # Only the store
//! RUST_LOG=cart_sync::framework=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` an add-to-cart that races another writer reads like:
//!
//! ```text
//! DEBUG add_or_increment{owner=alice product_id=p1}: List path=user/alice/cart matched=0 version=3
//! DEBUG add_or_increment{owner=alice product_id=p1}: Batch conflict path=user/alice/cart
//! DEBUG add_or_increment{owner=alice product_id=p1}: Cart changed before insert, looking again attempt=1
//! INFO  add_or_increment{owner=alice product_id=p1}: Incremented existing line quantity=2
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // Don't show module paths - spans carry owner and path instead
        .compact()
        .init();
}
