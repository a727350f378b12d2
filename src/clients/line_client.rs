use crate::clients::paths;
use crate::framework::{
    CollectionClient, DocumentId, Listing, Query, SnapshotReceiver, StoreClient, StoreError,
    Stored, TxDecision, Write,
};
use crate::line_actor::LineError;
use crate::model::{Line, RemoteLine};
use crate::session::OwnerId;
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Listing rounds a cart clear may run while other writers keep changing the cart.
const MAX_CLEAR_ATTEMPTS: u32 = 16;

/// Client for an owner's cart lines.
///
/// Every method takes the owner explicitly; the cart of `owner` lives at
/// `user/{owner}/cart`.
#[derive(Clone)]
pub struct LineClient {
    inner: StoreClient<Line>,
}

impl LineClient {
    pub fn new(inner: StoreClient<Line>) -> Self {
        Self { inner }
    }

    /// Starts a live subscription to the owner's cart.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, owner: &OwnerId) -> Result<SnapshotReceiver<Line>, LineError> {
        debug!("Subscribing to cart");
        self.inner
            .subscribe(paths::cart(owner))
            .await
            .map_err(Self::map_error)
    }

    /// Current cart contents, in insertion order.
    #[instrument(skip(self))]
    pub async fn lines(&self, owner: &OwnerId) -> Result<Vec<RemoteLine>, LineError> {
        let documents = self.list_all(paths::cart(owner)).await?;
        Ok(documents
            .into_iter()
            .map(|stored| to_remote(owner, stored))
            .collect())
    }

    /// Every line of the owner's cart that refers to `product_id`, together with the cart
    /// version the read observed.
    #[instrument(skip(self))]
    pub async fn lines_for_product(
        &self,
        owner: &OwnerId,
        product_id: &str,
    ) -> Result<Listing<Line>, LineError> {
        let product_id = product_id.to_string();
        self.inner
            .list(
                paths::cart(owner),
                Query::all().filter(move |line: &Line| line.product.id == product_id),
            )
            .await
            .map_err(Self::map_error)
    }

    /// Unconditionally appends a line.
    #[instrument(skip(self, line), fields(product_id = %line.product.id))]
    pub async fn add(&self, owner: &OwnerId, line: Line) -> Result<DocumentId, LineError> {
        info!("Adding cart line");
        self.inner
            .insert(paths::cart(owner), line)
            .await
            .map_err(Self::map_error)
    }

    /// Appends a line only if the cart is still at `expected_version`.
    ///
    /// Fails with [`LineError::Conflict`] when anything was committed to the cart since.
    #[instrument(skip(self, line), fields(product_id = %line.product.id))]
    pub async fn insert_if_unchanged(
        &self,
        owner: &OwnerId,
        expected_version: u64,
        line: Line,
    ) -> Result<DocumentId, LineError> {
        let receipt = self
            .inner
            .batch(paths::cart(owner), Some(expected_version), vec![Write::Insert(line)])
            .await
            .map_err(Self::map_error)?;
        receipt
            .ids
            .into_iter()
            .next()
            .ok_or_else(|| LineError::ActorCommunicationError("batch receipt without id".into()))
    }

    /// Optimistic read-modify-write of one line. `Ok(None)` means the line is gone.
    pub async fn transact<R: Send>(
        &self,
        owner: &OwnerId,
        id: &DocumentId,
        max_attempts: u32,
        decide: impl FnMut(&Line) -> TxDecision<Line, R> + Send,
    ) -> Result<Option<R>, LineError> {
        self.inner
            .transact(paths::cart(owner), id.clone(), max_attempts, decide)
            .await
            .map_err(Self::map_error)
    }

    /// Deletes one line. Returns `false` if it was already gone.
    #[instrument(skip(self))]
    pub async fn remove(&self, owner: &OwnerId, id: &DocumentId) -> Result<bool, LineError> {
        match self.delete(paths::cart(owner), id.clone()).await {
            Ok(()) => Ok(true),
            Err(LineError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Deletes every line of the cart in one batch and returns how many there were.
    ///
    /// The batch is guarded by the cart version the listing observed. A line added in
    /// between makes the batch fail, and the listing runs again so that line goes too.
    #[instrument(skip(self))]
    pub async fn clear(&self, owner: &OwnerId) -> Result<usize, LineError> {
        let path = paths::cart(owner);
        for attempt in 1..=MAX_CLEAR_ATTEMPTS {
            let listing = self
                .inner
                .list(path.clone(), Query::all())
                .await
                .map_err(Self::map_error)?;
            let writes: Vec<Write<Line>> = listing
                .documents
                .into_iter()
                .map(|stored| Write::Delete(stored.id))
                .collect();
            let count = writes.len();

            match self
                .inner
                .batch(path.clone(), Some(listing.version), writes)
                .await
            {
                Ok(_) => {
                    info!(count, "Cart cleared");
                    return Ok(count);
                }
                Err(e) if e.is_conflict() => {
                    debug!(attempt, "Cart changed while clearing, listing again");
                }
                Err(e) => return Err(Self::map_error(e)),
            }
        }
        Err(LineError::Contention(format!(
            "cart clear gave up after {MAX_CLEAR_ATTEMPTS} attempts"
        )))
    }
}

fn to_remote(owner: &OwnerId, stored: Stored<Line>) -> RemoteLine {
    RemoteLine {
        id: stored.id,
        owner: owner.clone(),
        line: stored.data,
    }
}

/// Converts a raw cart snapshot into remote lines of `owner`.
pub fn remote_lines(owner: &OwnerId, documents: &[Stored<Line>]) -> Vec<RemoteLine> {
    documents
        .iter()
        .cloned()
        .map(|stored| to_remote(owner, stored))
        .collect()
}

#[async_trait]
impl CollectionClient<Line> for LineClient {
    type Error = LineError;

    fn inner(&self) -> &StoreClient<Line> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        match e.into_rejection::<LineError>() {
            Ok(rejection) => rejection,
            Err(StoreError::NotFound(what)) => LineError::NotFound(what),
            Err(e @ StoreError::VersionConflict { .. }) => LineError::Conflict(e.to_string()),
            Err(e @ StoreError::Contention(_)) => LineError::Contention(e.to_string()),
            Err(e) => LineError::ActorCommunicationError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;
    use crate::framework::BatchReceipt;
    use crate::model::Product;

    fn chair() -> Line {
        Line::new(Product::new("p1", "Chair", 10.0))
    }

    #[tokio::test]
    async fn insert_if_unchanged_reports_conflict() {
        let mut mock = MockClient::<Line>::new();
        mock.expect_batch().return_err(StoreError::VersionConflict {
            target: "user/alice/cart".into(),
            expected: 1,
            actual: 2,
        });
        let client = LineClient::new(mock.client());

        let result = client
            .insert_if_unchanged(&OwnerId::from("alice"), 1, chair())
            .await;
        assert!(matches!(result, Err(LineError::Conflict(_))));
        mock.verify();
    }

    #[tokio::test]
    async fn validation_error_comes_back_typed() {
        let mut mock = MockClient::<Line>::new();
        mock.expect_insert()
            .return_err(StoreError::Rejected(Box::new(LineError::InvalidQuantity(0))));
        let client = LineClient::new(mock.client());

        let result = client.add(&OwnerId::from("alice"), chair().with_quantity(0)).await;
        assert_eq!(result, Err(LineError::InvalidQuantity(0)));
    }

    #[tokio::test]
    async fn remove_missing_line_is_not_an_error() {
        let mut mock = MockClient::<Line>::new();
        mock.expect_delete()
            .return_err(StoreError::NotFound("user/alice/cart/x".into()));
        let client = LineClient::new(mock.client());

        let removed = client
            .remove(&OwnerId::from("alice"), &DocumentId::from("x"))
            .await
            .unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn clear_deletes_every_listed_line() {
        let mut mock = MockClient::<Line>::new();
        mock.expect_list().return_ok(Listing {
            documents: vec![
                Stored { id: DocumentId::from("a"), version: 1, data: chair() },
                Stored { id: DocumentId::from("b"), version: 2, data: chair().with_color("red") },
            ],
            version: 2,
        });
        mock.expect_batch().return_ok(BatchReceipt {
            version: 3,
            ids: vec![DocumentId::from("a"), DocumentId::from("b")],
        });
        let client = LineClient::new(mock.client());

        assert_eq!(client.clear(&OwnerId::from("alice")).await.unwrap(), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn clear_lists_again_when_a_line_slips_in() {
        let mut mock = MockClient::<Line>::new();
        let stored = |id: &str, version| Stored {
            id: DocumentId::from(id),
            version,
            data: chair(),
        };
        mock.expect_list().return_ok(Listing {
            documents: vec![stored("a", 1)],
            version: 1,
        });
        mock.expect_batch().return_err(StoreError::VersionConflict {
            target: "user/alice/cart".into(),
            expected: 1,
            actual: 2,
        });
        mock.expect_list().return_ok(Listing {
            documents: vec![stored("a", 1), stored("b", 2)],
            version: 2,
        });
        mock.expect_batch().return_ok(BatchReceipt {
            version: 3,
            ids: vec![DocumentId::from("a"), DocumentId::from("b")],
        });
        let client = LineClient::new(mock.client());

        assert_eq!(client.clear(&OwnerId::from("alice")).await.unwrap(), 2);
        mock.verify();
    }

    #[tokio::test]
    async fn clear_against_real_store_is_guarded() {
        let (actor, client) = crate::line_actor::new(8);
        tokio::spawn(actor.run());
        let owner = OwnerId::from("alice");
        client.add(&owner, chair()).await.unwrap();
        client.add(&owner, chair().with_color("red")).await.unwrap();

        assert_eq!(client.clear(&owner).await.unwrap(), 2);
        assert!(client.lines(&owner).await.unwrap().is_empty());
        assert_eq!(client.clear(&owner).await.unwrap(), 0);
    }
}
