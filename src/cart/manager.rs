//! # Cart Manager
//!
//! Facade the UI talks to. Reads come from tagged-state channels; writes are triggers
//! that run in the background and report back through those channels.
//!
//! | Channel | Carries |
//! |---------|---------|
//! | [`CartManager::cart`] | `AsyncState<Snapshot>`: Loading around mutations, Success per commit, Error on failure |
//! | [`CartManager::add_to_cart_state`] | `AsyncState<Line>` of the last add-to-cart |
//! | [`CartManager::removal_requests`] | lines whose decrease needs a removal confirmation |
//! | [`CartManager::price_updates`] | cart total, recomputed per snapshot |
//!
//! Each trigger has an awaitable twin (`add`, `change_quantity`, `delete`) returning the
//! outcome directly.

use crate::cart::{
    CartError, LineMutationTransactor, MutationOutcome, PriceAggregator, QuantityChange,
    RemoteCollectionSync, SnapshotStream, UpsertOutcome, UpsertResolver,
};
use crate::clients::LineClient;
use crate::lifecycle::ShopConfig;
use crate::model::{AsyncState, Line, RemoteLine, Snapshot};
use crate::session::{OwnerId, Session};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

struct CartInner {
    sync: RemoteCollectionSync,
    transactor: LineMutationTransactor,
    upsert: UpsertResolver,
    add_to_cart: watch::Sender<AsyncState<Line>>,
    removals: broadcast::Sender<RemoteLine>,
    price: watch::Receiver<Option<f64>>,
}

/// The signed-in owner's cart.
///
/// Cheap to clone; every clone drives the same subscription. The subscription ends when
/// the last clone (and every in-flight trigger) is gone.
#[derive(Clone)]
pub struct CartManager {
    inner: Arc<CartInner>,
}

impl CartManager {
    /// Subscribes to the session owner's cart. Must be called inside a Tokio runtime.
    pub fn new(lines: LineClient, session: &Session, config: &ShopConfig) -> Result<Self, CartError> {
        let sync = RemoteCollectionSync::start(lines.clone(), session)?;
        let transactor =
            LineMutationTransactor::new(lines.clone(), session, config.max_transaction_attempts)?;
        let upsert = UpsertResolver::new(lines, session, config.max_transaction_attempts)?;
        let price = PriceAggregator::spawn(sync.subscribe());
        let (add_to_cart, _) = watch::channel(AsyncState::Unspecified);
        let (removals, _) = broadcast::channel(config.removal_buffer.max(1));

        Ok(Self {
            inner: Arc::new(CartInner {
                sync,
                transactor,
                upsert,
                add_to_cart,
                removals,
                price,
            }),
        })
    }

    pub fn owner(&self) -> &OwnerId {
        self.inner.sync.owner()
    }

    /// A new consumer of the cart state.
    pub fn cart(&self) -> SnapshotStream {
        self.inner.sync.subscribe()
    }

    pub fn latest(&self) -> AsyncState<Snapshot> {
        self.inner.sync.latest()
    }

    /// Newest successfully received snapshot.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.inner.sync.snapshot()
    }

    /// Total of the snapshot the cart shows, `None` while it is Loading or failed.
    pub fn total_price(&self) -> Option<f64> {
        *self.inner.price.borrow()
    }

    pub fn price_updates(&self) -> watch::Receiver<Option<f64>> {
        self.inner.price.clone()
    }

    pub fn add_to_cart_state(&self) -> watch::Receiver<AsyncState<Line>> {
        self.inner.add_to_cart.subscribe()
    }

    pub fn removal_requests(&self) -> broadcast::Receiver<RemoteLine> {
        self.inner.removals.subscribe()
    }

    // =========================================================================
    // TRIGGERS
    // =========================================================================

    pub fn add_or_increment(&self, candidate: Line) -> JoinHandle<()> {
        let cart = self.clone();
        tokio::spawn(async move {
            let _ = cart.add(candidate).await;
        })
    }

    pub fn increase(&self, line: &RemoteLine) -> JoinHandle<()> {
        self.spawn_change(line, QuantityChange::Increase)
    }

    pub fn decrease(&self, line: &RemoteLine) -> JoinHandle<()> {
        self.spawn_change(line, QuantityChange::Decrease)
    }

    pub fn remove(&self, line: &RemoteLine) -> JoinHandle<()> {
        let cart = self.clone();
        let line = line.clone();
        tokio::spawn(async move {
            let _ = cart.delete(&line).await;
        })
    }

    fn spawn_change(&self, line: &RemoteLine, change: QuantityChange) -> JoinHandle<()> {
        let cart = self.clone();
        let line = line.clone();
        tokio::spawn(async move {
            let _ = cart.change_quantity(&line, change).await;
        })
    }

    // =========================================================================
    // AWAITABLE OPERATIONS
    // =========================================================================

    /// Adds one unit of `candidate`, publishing Loading then Success/Error on the
    /// add-to-cart channel.
    pub async fn add(&self, candidate: Line) -> Result<UpsertOutcome, CartError> {
        self.inner.add_to_cart.send_replace(AsyncState::Loading);
        let result = self.inner.upsert.add_or_increment(candidate.clone()).await;
        let state = match &result {
            Ok(_) => AsyncState::Success(candidate),
            Err(e) => {
                warn!(error = %e, "Add to cart failed");
                AsyncState::Error(e.to_string())
            }
        };
        self.inner.add_to_cart.send_replace(state);
        result
    }

    /// Changes the quantity of `line` by one.
    ///
    /// The line is looked up again in the newest snapshot first; if it is gone the call
    /// does nothing. Decreasing a single-unit line raises a removal request instead of
    /// writing.
    #[instrument(skip(self, line), fields(owner = %self.owner(), id = %line.id))]
    pub async fn change_quantity(
        &self,
        line: &RemoteLine,
        change: QuantityChange,
    ) -> Result<MutationOutcome, CartError> {
        let Some(current) = self.resolve(line) else {
            debug!("Line no longer in cart, ignoring");
            return Ok(MutationOutcome::Stale(line.id.clone()));
        };
        if change == QuantityChange::Decrease && current.line.quantity <= 1 {
            self.request_removal(current.clone());
            return Ok(MutationOutcome::RemovalRequested(current));
        }

        self.inner.sync.publish(AsyncState::Loading);
        let result = self.inner.transactor.change(&current.id, change).await;
        match &result {
            Ok(MutationOutcome::RemovalRequested(line)) => {
                self.request_removal(line.clone());
                self.inner.sync.settle();
            }
            Ok(MutationOutcome::Stale(_)) => self.inner.sync.settle(),
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Quantity change failed");
                self.inner.sync.publish(AsyncState::Error(e.to_string()));
            }
        }
        result
    }

    /// Deletes `line` after the user confirmed the removal.
    #[instrument(skip(self, line), fields(owner = %self.owner(), id = %line.id))]
    pub async fn delete(&self, line: &RemoteLine) -> Result<MutationOutcome, CartError> {
        let Some(current) = self.resolve(line) else {
            debug!("Line no longer in cart, ignoring");
            return Ok(MutationOutcome::Stale(line.id.clone()));
        };
        let result = self.inner.transactor.remove(&current.id).await;
        if let Err(e) = &result {
            warn!(error = %e, "Line removal failed");
            self.inner.sync.publish(AsyncState::Error(e.to_string()));
        }
        result
    }

    /// Finds `line` in the newest snapshot by id. A line that was removed and added again
    /// elsewhere is a different document and does not match.
    fn resolve(&self, line: &RemoteLine) -> Option<RemoteLine> {
        self.inner
            .sync
            .snapshot()?
            .into_iter()
            .find(|candidate| candidate.id == line.id)
    }

    fn request_removal(&self, line: RemoteLine) {
        debug!(id = %line.id, "Removal confirmation requested");
        if self.inner.removals.send(line).is_err() {
            debug!("Nobody is listening for removal requests");
        }
    }

    pub(crate) fn mark_loading(&self) {
        self.inner.sync.publish(AsyncState::Loading);
    }

    pub(crate) fn settle(&self) {
        self.inner.sync.settle();
    }
}
