use crate::address_actor::AddressError;
use crate::clients::paths;
use crate::framework::{CollectionClient, DocumentId, SnapshotReceiver, StoreClient, StoreError};
use crate::model::Address;
use crate::session::OwnerId;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

/// Client for an owner's address book at `user/{owner}/address`.
#[derive(Clone)]
pub struct AddressClient {
    inner: StoreClient<Address>,
}

impl AddressClient {
    pub fn new(inner: StoreClient<Address>) -> Self {
        Self { inner }
    }

    /// Saves a new address. Incomplete addresses are refused before reaching the store.
    #[instrument(skip(self, address), fields(title = %address.title))]
    pub async fn add(&self, owner: &OwnerId, address: Address) -> Result<DocumentId, AddressError> {
        if !address.is_complete() {
            warn!("Refusing incomplete address");
            return Err(AddressError::Incomplete);
        }
        info!("Saving address");
        self.inner
            .insert(paths::addresses(owner), address)
            .await
            .map_err(Self::map_error)
    }

    /// Saved addresses, oldest first.
    pub async fn addresses(&self, owner: &OwnerId) -> Result<Vec<Address>, AddressError> {
        let documents = self.list_all(paths::addresses(owner)).await?;
        Ok(documents.into_iter().map(|stored| stored.data).collect())
    }

    /// Starts a live subscription to the owner's address book.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, owner: &OwnerId) -> Result<SnapshotReceiver<Address>, AddressError> {
        debug!("Subscribing to address book");
        self.inner
            .subscribe(paths::addresses(owner))
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl CollectionClient<Address> for AddressClient {
    type Error = AddressError;

    fn inner(&self) -> &StoreClient<Address> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        match e.into_rejection::<AddressError>() {
            Ok(rejection) => rejection,
            Err(e) => AddressError::ActorCommunicationError(e.to_string()),
        }
    }
}
