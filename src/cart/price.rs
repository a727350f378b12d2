use crate::cart::SnapshotStream;
use crate::model::{AsyncState, Line, RemoteLine, Snapshot};
use tokio::sync::watch;
use tracing::debug;

/// Derives the cart total from cart snapshots.
pub struct PriceAggregator;

impl PriceAggregator {
    /// `Σ quantity × effective unit price`.
    pub fn total<'a>(lines: impl IntoIterator<Item = &'a Line>) -> f64 {
        lines.into_iter().map(Line::subtotal).sum()
    }

    pub fn of_snapshot(snapshot: &[RemoteLine]) -> f64 {
        Self::total(snapshot.iter().map(|remote| &remote.line))
    }

    /// The total of a successful snapshot; nothing for any other state.
    pub fn derive(state: &AsyncState<Snapshot>) -> Option<f64> {
        state.success().map(|snapshot| Self::of_snapshot(snapshot))
    }

    /// Recomputes the total on every state of `stream`.
    ///
    /// The returned channel holds the total while the cart shows a snapshot and `None`
    /// while it is Loading, failed or not started.
    pub fn spawn(mut stream: SnapshotStream) -> watch::Receiver<Option<f64>> {
        let (sender, receiver) = watch::channel(None);
        tokio::spawn(async move {
            while let Some(state) = stream.next().await {
                let total = Self::derive(&state);
                debug!(?total, "Cart total");
                if sender.send(total).is_err() {
                    break;
                }
            }
        });
        receiver
    }
}
