//! # Checkout
//!
//! Turning a cart into an order, the addresses it ships to, and reading orders back.

pub mod addresses;
pub mod error;
pub mod history;
pub mod workflow;

pub use addresses::AddressBook;
pub use error::{CheckoutError, CheckoutStep, StepFailure};
pub use history::OrderHistory;
pub use workflow::{Checkout, OrderPlacementWorkflow};
