//! Error types for checkout and order history.

use crate::order_actor::OrderError;
use crate::session::SessionError;
use std::fmt;
use thiserror::Error;

/// One of the three writes that make up a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Append the order to the owner's history.
    History,
    /// Append the order to the global ledger.
    Ledger,
    /// Delete every line of the owner's cart.
    ClearCart,
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckoutStep::History => "order history",
            CheckoutStep::Ledger => "order ledger",
            CheckoutStep::ClearCart => "cart clear",
        })
    }
}

/// A checkout write that did not commit.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure {
    pub step: CheckoutStep,
    pub reason: String,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.step, self.reason)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error(transparent)]
    NotSignedIn(#[from] SessionError),

    /// Some writes committed and others did not. Nothing was rolled back.
    #[error("Checkout partially applied: committed {}, failed {}", join(.committed), join(.failed))]
    PartialCheckout {
        committed: Vec<CheckoutStep>,
        failed: Vec<StepFailure>,
    },

    /// None of the writes committed.
    #[error("Checkout failed: {}", join(.0))]
    Failed(Vec<StepFailure>),

    /// The order history could not be read.
    #[error("Order store failure: {0}")]
    Remote(#[from] OrderError),

    /// The cart has no snapshot to check out yet.
    #[error("Cart is not loaded")]
    CartNotLoaded,
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "nothing".to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_checkout_names_steps() {
        let error = CheckoutError::PartialCheckout {
            committed: vec![CheckoutStep::History, CheckoutStep::Ledger],
            failed: vec![StepFailure {
                step: CheckoutStep::ClearCart,
                reason: "store closed".into(),
            }],
        };
        assert_eq!(
            error.to_string(),
            "Checkout partially applied: committed order history, order ledger, failed cart clear (store closed)"
        );
    }
}
