use crate::checkout::CheckoutError;
use crate::clients::OrderClient;
use crate::model::{AsyncState, Order};
use crate::session::{OwnerId, Session};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Read side of the orders: the owner's history and the global ledger.
///
/// Each fetch is one-shot; the returned channel goes Loading then Success or Error.
#[derive(Clone)]
pub struct OrderHistory {
    orders: OrderClient,
    owner: OwnerId,
}

impl OrderHistory {
    pub fn new(orders: OrderClient, session: &Session) -> Result<Self, CheckoutError> {
        Ok(Self {
            orders,
            owner: session.owner()?.clone(),
        })
    }

    pub async fn orders_of(&self) -> Result<Vec<Order>, CheckoutError> {
        let orders = self.orders.history(&self.owner).await?;
        debug!(owner = %self.owner, count = orders.len(), "Order history fetched");
        Ok(orders)
    }

    pub async fn ledger(&self) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.ledger().await?)
    }

    pub fn fetch_orders(&self) -> watch::Receiver<AsyncState<Vec<Order>>> {
        let history = self.clone();
        publish(async move { history.orders_of().await })
    }

    pub fn fetch_ledger(&self) -> watch::Receiver<AsyncState<Vec<Order>>> {
        let history = self.clone();
        publish(async move { history.ledger().await })
    }
}

fn publish(
    fetch: impl std::future::Future<Output = Result<Vec<Order>, CheckoutError>> + Send + 'static,
) -> watch::Receiver<AsyncState<Vec<Order>>> {
    let (sender, receiver) = watch::channel(AsyncState::Loading);
    tokio::spawn(async move {
        let result = fetch.await;
        if let Err(e) = &result {
            warn!(error = %e, "Order fetch failed");
        }
        sender.send_replace(AsyncState::from(result));
    });
    receiver
}
