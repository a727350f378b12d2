use crate::catalog::{PageOutcome, PagingCursor};
use crate::clients::ProductClient;
use crate::model::{AsyncState, Product};
use crate::product_actor::ProductError;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::warn;

struct FeedInner {
    products: ProductClient,
    cursor: Mutex<PagingCursor>,
    best_products: watch::Sender<AsyncState<Vec<Product>>>,
}

/// Product listings for the storefront: a growing "best products" window plus one-shot
/// category and discount listings.
#[derive(Clone)]
pub struct ProductFeed {
    inner: Arc<FeedInner>,
}

impl ProductFeed {
    pub fn new(products: ProductClient, page_size: usize) -> Self {
        let (best_products, _) = watch::channel(AsyncState::Unspecified);
        Self {
            inner: Arc::new(FeedInner {
                products,
                cursor: Mutex::new(PagingCursor::new(page_size)),
                best_products,
            }),
        }
    }

    pub fn best_products(&self) -> watch::Receiver<AsyncState<Vec<Product>>> {
        self.inner.best_products.subscribe()
    }

    pub fn fetch_next_page(&self) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            let _ = feed.next_page().await;
        })
    }

    /// Grows the window by one page. Publishes Loading and then the new window; once the
    /// end is reached the channel keeps the last window and nothing is fetched any more.
    pub async fn next_page(&self) -> Result<PageOutcome, ProductError> {
        // Fetches are serialised so every call sees the previous call's window
        let mut cursor = self.inner.cursor.lock().await;
        if cursor.is_end() {
            return Ok(PageOutcome::Exhausted);
        }

        self.inner.best_products.send_replace(AsyncState::Loading);
        let result = cursor.fetch_next_page(&self.inner.products).await;
        let state = match &result {
            Ok(_) => AsyncState::Success(cursor.window().to_vec()),
            Err(e) => {
                warn!(error = %e, page = cursor.page(), "Product page fetch failed");
                AsyncState::Error(e.to_string())
            }
        };
        self.inner.best_products.send_replace(state);
        result
    }

    pub async fn category(&self, category: &str) -> AsyncState<Vec<Product>> {
        self.inner.products.by_category(category).await.into()
    }

    pub async fn discounted(&self, category: Option<&str>) -> AsyncState<Vec<Product>> {
        self.inner.products.discounted(category).await.into()
    }
}
