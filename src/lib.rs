#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Cart Sync
//!
//! > **A live, multi-writer shopping cart on top of an actor-backed document store.**
//!
//! Every cart line is a document in the owner's cart collection. Several clients (another
//! device, another tab, a background task) may edit the same cart at the same time; each
//! one sees the others' changes through a live subscription, and no increment or decrement
//! is ever lost.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Why a document store behind actors?
//!
//! - **Actor Model**: each store owns its collections in one Tokio task and processes
//!   requests sequentially, so no locks guard the data.
//! - **Optimistic concurrency**: every document and every collection carries a version.
//!   Writers read, decide and commit with compare-and-set; a lost race re-runs the decision
//!   on fresh data instead of blocking.
//! - **Latest-value channels**: consumers read `tokio::sync::watch` channels of
//!   [`AsyncState`](model::AsyncState). A slow consumer skips intermediate states and always
//!   ends on the newest one.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: one store for every document
//! [`CollectionActor<T: Document>`](framework::CollectionActor) serves cart lines, orders and
//! products alike. Domain rules live in each type's [`Document::validate`](framework::Document::validate).
//!
//! ### Mocking: testing without a store
//! [`MockClient`](framework::mock::MockClient) answers store requests from a queue of
//! expectations. See the [`framework::mock`] module.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic document store: collections, versions, batches, live listeners.
//! - **Key items**: [`CollectionActor`](framework::CollectionActor), [`StoreClient`](framework::StoreClient).
//!
//! ### 2. The Stores ([`line_actor`], [`order_actor`], [`product_actor`], [`address_actor`])
//! One store per document type, with its own error type.
//!
//! ### 3. The Interface ([`clients`])
//! Domain wrappers that know the collection layout (`user/{owner}/cart`, `orders`, ...).
//!
//! ### 4. The Cart ([`cart`])
//! Subscription, quantity transactions, add-or-increment and pricing behind
//! [`CartManager`](cart::CartManager).
//!
//! ### 5. Checkout and Catalog ([`checkout`], [`catalog`])
//! Order placement across three collections, the address book it ships to, and paged and
//! filtered product reads.
//!
//! ### 6. The Orchestrator ([`lifecycle`])
//! Starts the stores, hands out components and shuts everything down.
//! - **Key items**: [`ShopSystem`](lifecycle::ShopSystem), [`ShopConfig`](lifecycle::ShopConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Use a config file
//! CART_SYNC_CONFIG=shop.toml cargo run
//! ```

pub mod address_actor;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod line_actor;
pub mod model;
pub mod order_actor;
pub mod product_actor;
pub mod session;
