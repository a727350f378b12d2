use crate::clients::paths;
use crate::framework::{CollectionClient, DocumentId, StoreClient, StoreError};
use crate::model::Order;
use crate::order_actor::OrderError;
use crate::session::OwnerId;
use async_trait::async_trait;
use tracing::{info, instrument};

/// Client for the order store: the per-owner history and the global ledger.
#[derive(Clone)]
pub struct OrderClient {
    inner: StoreClient<Order>,
}

impl OrderClient {
    pub fn new(inner: StoreClient<Order>) -> Self {
        Self { inner }
    }

    /// Appends `order` to the owner's private history.
    #[instrument(skip(self, order), fields(order_id = %order.order_id()))]
    pub async fn append_to_history(
        &self,
        owner: &OwnerId,
        order: Order,
    ) -> Result<DocumentId, OrderError> {
        info!("Appending order to history");
        self.inner
            .insert(paths::order_history(owner), order)
            .await
            .map_err(Self::map_error)
    }

    /// Appends `order` to the global ledger.
    #[instrument(skip(self, order), fields(order_id = %order.order_id()))]
    pub async fn append_to_ledger(&self, order: Order) -> Result<DocumentId, OrderError> {
        info!("Appending order to ledger");
        self.inner
            .insert(paths::order_ledger(), order)
            .await
            .map_err(Self::map_error)
    }

    /// The owner's orders, oldest first.
    pub async fn history(&self, owner: &OwnerId) -> Result<Vec<Order>, OrderError> {
        let documents = self.list_all(paths::order_history(owner)).await?;
        Ok(documents.into_iter().map(|stored| stored.data).collect())
    }

    /// Every order ever placed, oldest first.
    pub async fn ledger(&self) -> Result<Vec<Order>, OrderError> {
        let documents = self.list_all(paths::order_ledger()).await?;
        Ok(documents.into_iter().map(|stored| stored.data).collect())
    }
}

#[async_trait]
impl CollectionClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &StoreClient<Order> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        match e.into_rejection::<OrderError>() {
            Ok(rejection) => rejection,
            Err(StoreError::NotFound(what)) => OrderError::NotFound(what),
            Err(e) => OrderError::ActorCommunicationError(e.to_string()),
        }
    }
}
