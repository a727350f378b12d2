//! # Remote Collection Sync
//!
//! Bridges the store's live subscription of one cart into an [`AsyncState`] channel.
//!
//! A background task owns the store listener. It publishes `Success(snapshot)` for the
//! initial contents and after every commit, `Error` when the subscription cannot be
//! opened or the store goes away. All consumers read the same `watch` channel, so they get
//! latest-value semantics: a late subscriber only ever sees the newest state.
//!
//! Cancelling the sync (or dropping it) stops the task, which drops the store listener.

use crate::cart::CartError;
use crate::clients::{remote_lines, LineClient};
use crate::model::{AsyncState, Snapshot};
use crate::session::{OwnerId, Session};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Live view of one owner's cart.
pub struct RemoteCollectionSync {
    owner: OwnerId,
    state: Arc<watch::Sender<AsyncState<Snapshot>>>,
    latest_snapshot: Arc<watch::Sender<Option<Snapshot>>>,
    token: CancellationToken,
}

impl RemoteCollectionSync {
    /// Opens the subscription for the session's owner. The state starts as `Loading`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(lines: LineClient, session: &Session) -> Result<Self, CartError> {
        let owner = session.owner()?.clone();
        let (state, _) = watch::channel(AsyncState::Loading);
        let (latest_snapshot, _) = watch::channel(None);
        let state = Arc::new(state);
        let latest_snapshot = Arc::new(latest_snapshot);
        let token = CancellationToken::new();

        tokio::spawn(forward(
            lines,
            owner.clone(),
            state.clone(),
            latest_snapshot.clone(),
            token.clone(),
        ));

        Ok(Self {
            owner,
            state,
            latest_snapshot,
            token,
        })
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// A new consumer of the cart state. Its first item is the current state.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream {
            receiver: self.state.subscribe(),
            token: self.token.child_token(),
            started: false,
        }
    }

    /// The newest state, read synchronously.
    pub fn latest(&self) -> AsyncState<Snapshot> {
        self.state.borrow().clone()
    }

    /// The newest successfully received snapshot, if any arrived yet.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.latest_snapshot.borrow().clone()
    }

    /// Stops the subscription and releases the store listener.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Puts a local state (Loading around a mutation, or its Error) on the cart channel.
    pub(crate) fn publish(&self, state: AsyncState<Snapshot>) {
        self.state.send_replace(state);
    }

    /// Restores the newest snapshot when a mutation left the channel on `Loading` without
    /// committing anything.
    pub(crate) fn settle(&self) {
        let Some(snapshot) = self.snapshot() else {
            return;
        };
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                *state = AsyncState::Success(snapshot);
                true
            } else {
                false
            }
        });
    }
}

impl Drop for RemoteCollectionSync {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn forward(
    lines: LineClient,
    owner: OwnerId,
    state: Arc<watch::Sender<AsyncState<Snapshot>>>,
    latest_snapshot: Arc<watch::Sender<Option<Snapshot>>>,
    token: CancellationToken,
) {
    let subscribed = tokio::select! {
        _ = token.cancelled() => return,
        subscribed = lines.subscribe(&owner) => subscribed,
    };
    // The listener alone keeps the stream going; holding the client would keep the
    // store alive past shutdown.
    drop(lines);

    let mut remote = match subscribed {
        Ok(remote) => remote,
        Err(e) => {
            warn!(%owner, error = %e, "Cart subscription failed");
            state.send_replace(AsyncState::Error(e.to_string()));
            return;
        }
    };
    info!(%owner, "Cart subscription started");

    loop {
        let documents = remote.borrow_and_update().clone();
        let snapshot = remote_lines(&owner, &documents);
        debug!(%owner, lines = snapshot.len(), "Cart snapshot");
        latest_snapshot.send_replace(Some(snapshot.clone()));
        state.send_replace(AsyncState::Success(snapshot));

        let changed = tokio::select! {
            _ = token.cancelled() => {
                info!(%owner, "Cart subscription cancelled");
                return;
            }
            changed = remote.changed() => changed,
        };
        if changed.is_err() {
            warn!(%owner, "Remote listener closed");
            state.send_replace(AsyncState::Error("remote listener closed".to_string()));
            return;
        }
    }
}

/// One consumer's view of the cart state.
///
/// `next` yields the current state first, then every newer state. Intermediate states
/// published while the consumer was busy are skipped.
pub struct SnapshotStream {
    receiver: watch::Receiver<AsyncState<Snapshot>>,
    token: CancellationToken,
    started: bool,
}

impl SnapshotStream {
    /// Waits for the next state. `None` once the stream or its sync is cancelled.
    pub async fn next(&mut self) -> Option<AsyncState<Snapshot>> {
        if self.token.is_cancelled() {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.receiver.borrow_and_update().clone());
        }

        let changed = tokio::select! {
            _ = self.token.cancelled() => return None,
            changed = self.receiver.changed() => changed,
        };
        changed.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Ends this stream only; other consumers of the same sync keep running.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}
