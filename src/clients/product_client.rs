use crate::clients::paths;
use crate::framework::{CollectionClient, DocumentId, Query, StoreClient, StoreError};
use crate::model::Product;
use crate::product_actor::ProductError;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the product catalog.
#[derive(Clone)]
pub struct ProductClient {
    inner: StoreClient<Product>,
}

impl ProductClient {
    pub fn new(inner: StoreClient<Product>) -> Self {
        Self { inner }
    }

    /// Stores `product` under its own id, replacing any previous version.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn create_product(&self, product: Product) -> Result<DocumentId, ProductError> {
        let id = DocumentId::from(product.id.as_str());
        self.inner
            .set(paths::products(), id.clone(), product)
            .await
            .map_err(Self::map_error)?;
        Ok(id)
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, ProductError> {
        let stored = self.get(paths::products(), DocumentId::from(id)).await?;
        Ok(stored.map(|stored| stored.data))
    }

    /// The first `limit` products, in catalog order.
    #[instrument(skip(self))]
    pub async fn first(&self, limit: usize) -> Result<Vec<Product>, ProductError> {
        self.query(Query::all().limit(limit)).await
    }

    /// Every product of `category`.
    #[instrument(skip(self))]
    pub async fn by_category(&self, category: &str) -> Result<Vec<Product>, ProductError> {
        let category = category.to_string();
        self.query(Query::all().filter(move |product: &Product| product.category == category))
            .await
    }

    /// Products carrying a discount, optionally restricted to one category.
    #[instrument(skip(self))]
    pub async fn discounted(&self, category: Option<&str>) -> Result<Vec<Product>, ProductError> {
        let category = category.map(str::to_string);
        self.query(Query::all().filter(move |product: &Product| {
            product.is_discounted()
                && category
                    .as_deref()
                    .map_or(true, |category| product.category == category)
        }))
        .await
    }

    async fn query(&self, query: Query<Product>) -> Result<Vec<Product>, ProductError> {
        let listing = self
            .inner
            .list(paths::products(), query)
            .await
            .map_err(Self::map_error)?;
        debug!(count = listing.documents.len(), "Products listed");
        Ok(listing.into_data())
    }
}

#[async_trait]
impl CollectionClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &StoreClient<Product> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        match e.into_rejection::<ProductError>() {
            Ok(rejection) => rejection,
            Err(StoreError::NotFound(what)) => ProductError::NotFound(what),
            Err(e) => ProductError::ActorCommunicationError(e.to_string()),
        }
    }
}
