//! # Paging Cursor
//!
//! Grows a window over an ordered collection one page at a time. Every fetch re-reads the
//! whole prefix (`page × page_size` items); the end of the data is detected when a fetch
//! returns exactly the previous window.

use crate::clients::ProductClient;
use crate::model::Product;
use crate::product_actor::ProductError;
use async_trait::async_trait;
use tracing::debug;

/// Anything that can return the first `limit` products in a stable order.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn first(&self, limit: usize) -> Result<Vec<Product>, ProductError>;
}

#[async_trait]
impl ProductSource for ProductClient {
    async fn first(&self, limit: usize) -> Result<Vec<Product>, ProductError> {
        ProductClient::first(self, limit).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// A grown window.
    Page(Vec<Product>),
    /// This fetch found nothing new; the cursor is now at its end.
    EndOfData,
    /// The cursor had already reached its end; nothing was fetched.
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct PagingCursor {
    page: usize,
    page_size: usize,
    previous: Vec<Product>,
    end_of_data: bool,
}

impl PagingCursor {
    /// A cursor on page 1. A zero page size is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            previous: Vec::new(),
            end_of_data: false,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_end(&self) -> bool {
        self.end_of_data
    }

    /// The last window handed out.
    pub fn window(&self) -> &[Product] {
        &self.previous
    }

    pub async fn fetch_next_page<S: ProductSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<PageOutcome, ProductError> {
        if self.end_of_data {
            return Ok(PageOutcome::Exhausted);
        }

        let limit = self.page.saturating_mul(self.page_size);
        let window = source.first(limit).await?;
        if window == self.previous {
            debug!(page = self.page, size = window.len(), "End of data");
            self.end_of_data = true;
            return Ok(PageOutcome::EndOfData);
        }

        debug!(page = self.page, size = window.len(), "Page fetched");
        self.page += 1;
        self.previous = window.clone();
        Ok(PageOutcome::Page(window))
    }
}
