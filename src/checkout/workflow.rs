//! # Order Placement
//!
//! A checkout is three independent writes issued concurrently:
//!
//! 1. append the order to the owner's history (`user/{owner}/orders`)
//! 2. append the order to the global ledger (`orders`)
//! 3. delete every line of the owner's cart, in one batch
//!
//! The writes live in different collections, so they cannot commit atomically. The
//! workflow reports success only when all three acknowledge; otherwise it names which
//! steps committed and which failed, and leaves the committed ones in place.

use crate::cart::{CartManager, PriceAggregator};
use crate::checkout::{CheckoutError, CheckoutStep, StepFailure};
use crate::clients::{LineClient, OrderClient};
use crate::model::{Address, AsyncState, Line, Order};
use crate::session::{OwnerId, Session};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

#[derive(Clone)]
pub struct OrderPlacementWorkflow {
    orders: OrderClient,
    lines: LineClient,
    owner: OwnerId,
}

impl OrderPlacementWorkflow {
    pub fn new(orders: OrderClient, lines: LineClient, session: &Session) -> Result<Self, CheckoutError> {
        Ok(Self::for_owner(orders, lines, session.owner()?.clone()))
    }

    pub(crate) fn for_owner(orders: OrderClient, lines: LineClient, owner: OwnerId) -> Self {
        Self {
            orders,
            lines,
            owner,
        }
    }

    /// Places an order for `lines`, shipped to `address`.
    ///
    /// The caller is responsible for passing a non-empty line set and a complete address.
    pub async fn place_order(
        &self,
        lines: Vec<Line>,
        address: Address,
        total_price: f64,
    ) -> Result<Order, CheckoutError> {
        let (order, _) = self.place(lines, address, total_price).await?;
        Ok(order)
    }

    /// Places the order and also reports how many cart lines the clear deleted.
    #[instrument(skip(self, lines, address), fields(owner = %self.owner))]
    pub(crate) async fn place(
        &self,
        lines: Vec<Line>,
        address: Address,
        total_price: f64,
    ) -> Result<(Order, usize), CheckoutError> {
        let order = Order::place(lines, address, total_price);
        info!(order_id = %order.order_id(), lines = order.lines().len(), total_price, "Placing order");

        let (history, ledger, cleared) = tokio::join!(
            self.orders.append_to_history(&self.owner, order.clone()),
            self.orders.append_to_ledger(order.clone()),
            self.lines.clear(&self.owner),
        );

        let cleared_lines = *cleared.as_ref().unwrap_or(&0);
        let mut committed = Vec::new();
        let mut failed = Vec::new();
        let mut record = |step: CheckoutStep, result: Result<(), String>| match result {
            Ok(()) => committed.push(step),
            Err(reason) => failed.push(StepFailure { step, reason }),
        };
        record(CheckoutStep::History, history.map(drop).map_err(|e| e.to_string()));
        record(CheckoutStep::Ledger, ledger.map(drop).map_err(|e| e.to_string()));
        record(CheckoutStep::ClearCart, cleared.map(drop).map_err(|e| e.to_string()));

        if failed.is_empty() {
            info!(order_id = %order.order_id(), cleared_lines, "Order placed");
            Ok((order, cleared_lines))
        } else if committed.is_empty() {
            warn!(order_id = %order.order_id(), ?failed, "Order placement failed");
            Err(CheckoutError::Failed(failed))
        } else {
            error!(order_id = %order.order_id(), ?committed, ?failed, "Order placement partially applied");
            Err(CheckoutError::PartialCheckout { committed, failed })
        }
    }
}

struct CheckoutInner {
    cart: CartManager,
    workflow: OrderPlacementWorkflow,
    order_state: watch::Sender<AsyncState<Order>>,
}

/// Checkout facade bound to a cart.
///
/// Placing an order publishes Loading on both the cart channel and the order channel, then
/// the order (or the failure) on the order channel. The cart itself turns back to Success
/// once the clear reaches the subscription.
#[derive(Clone)]
pub struct Checkout {
    inner: Arc<CheckoutInner>,
}

impl Checkout {
    pub fn new(cart: CartManager, orders: OrderClient, lines: LineClient) -> Self {
        let workflow = OrderPlacementWorkflow::for_owner(orders, lines, cart.owner().clone());
        let (order_state, _) = watch::channel(AsyncState::Unspecified);
        Self {
            inner: Arc::new(CheckoutInner {
                cart,
                workflow,
                order_state,
            }),
        }
    }

    pub fn order_state(&self) -> watch::Receiver<AsyncState<Order>> {
        self.inner.order_state.subscribe()
    }

    /// Fire-and-forget variant of [`Checkout::submit`].
    pub fn place_order(&self, lines: Vec<Line>, address: Address, total_price: f64) -> JoinHandle<()> {
        let checkout = self.clone();
        tokio::spawn(async move {
            let _ = checkout.submit(lines, address, total_price).await;
        })
    }

    /// Checks out the newest cart snapshot at its current total.
    pub fn checkout_cart(&self, address: Address) -> JoinHandle<()> {
        let checkout = self.clone();
        tokio::spawn(async move {
            let _ = checkout.submit_cart(address).await;
        })
    }

    pub async fn submit_cart(&self, address: Address) -> Result<Order, CheckoutError> {
        let Some(snapshot) = self.inner.cart.snapshot() else {
            let error = CheckoutError::CartNotLoaded;
            self.inner
                .order_state
                .send_replace(AsyncState::Error(error.to_string()));
            return Err(error);
        };
        let total_price = PriceAggregator::of_snapshot(&snapshot);
        let lines = snapshot.into_iter().map(|remote| remote.line).collect();
        self.submit(lines, address, total_price).await
    }

    pub async fn submit(
        &self,
        lines: Vec<Line>,
        address: Address,
        total_price: f64,
    ) -> Result<Order, CheckoutError> {
        self.inner.cart.mark_loading();
        self.inner.order_state.send_replace(AsyncState::Loading);

        let result = self.inner.workflow.place(lines, address, total_price).await;
        match result {
            Ok((order, cleared_lines)) => {
                // An empty clear commits nothing, so no snapshot will replace Loading
                if cleared_lines == 0 {
                    self.inner.cart.settle();
                }
                self.inner
                    .order_state
                    .send_replace(AsyncState::Success(order.clone()));
                Ok(order)
            }
            Err(e) => {
                self.inner.cart.settle();
                self.inner
                    .order_state
                    .send_replace(AsyncState::Error(e.to_string()));
                Err(e)
            }
        }
    }
}
