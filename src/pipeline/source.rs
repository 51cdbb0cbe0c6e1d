//! Where products come from when the cache misses

use crate::extract::Extractor;
use crate::fetch::{FetchController, FetchError};
use crate::product::Product;
use async_trait::async_trait;
use std::sync::Arc;

/// Produces a freshly extracted product for a code
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetches and extracts the product page for `code`
    ///
    /// An unmatched page is not an error; it yields a product with only its
    /// code set.
    async fn scrape(&self, code: &str) -> Result<Product, FetchError>;
}

/// Live source: the fetch controller followed by the extraction engine
#[derive(Debug)]
pub struct ProductScraper {
    controller: Arc<FetchController>,
    extractor: Extractor,
}

impl ProductScraper {
    pub fn new(controller: Arc<FetchController>) -> Self {
        Self {
            controller,
            extractor: Extractor::new(),
        }
    }
}

#[async_trait]
impl ProductSource for ProductScraper {
    async fn scrape(&self, code: &str) -> Result<Product, FetchError> {
        let page = self.controller.fetch(code).await?;
        let product = self.extractor.extract(&page.body, code);

        tracing::debug!(
            "Extracted {}: name={} categories={} ranks={} dimensions={}",
            code,
            !product.name.is_empty(),
            product.categories.len(),
            product.ranks.len(),
            product.dimensions.len()
        );

        Ok(product)
    }
}
