//! Pipeline orchestrator
//!
//! One request walks through these steps:
//! 1. Reject an empty product code
//! 2. Serve a cached snapshot if one exists and carries a name
//! 3. Otherwise fetch and extract the page
//! 4. Persist a storable product durably, then refresh its cache snapshot
//! 5. Map the product to its response shape
//!
//! Identical concurrent requests are not merged; each one misses the cache
//! and fetches on its own, and the later write wins.

mod source;

pub use source::{ProductScraper, ProductSource};

use crate::product::{Product, ProductView};
use crate::storage::ProductStore;
use crate::ScraperError;
use chrono::Utc;
use std::time::Duration;

/// Lifetime of a cache snapshot unless configured otherwise
pub const DEFAULT_TTL: Duration = Duration::from_secs(20 * 60);

/// Cache-aside product lookup service
#[derive(Debug)]
pub struct ProductService<P, S> {
    source: P,
    store: S,
    ttl: Duration,
}

impl<P, S> ProductService<P, S>
where
    P: ProductSource,
    S: ProductStore,
{
    /// Creates a service using the default cache TTL
    pub fn new(source: P, store: S) -> Self {
        Self {
            source,
            store,
            ttl: DEFAULT_TTL,
        }
    }

    /// Overrides the cache TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Looks up a product and returns it in response shape
    pub async fn get_product(&self, code: &str) -> Result<ProductView, ScraperError> {
        let product = self.lookup(code).await?;
        Ok(ProductView::from(&product))
    }

    /// Looks up a product, fetching it when the cache has nothing usable
    ///
    /// A product that extraction could not fill in is returned as is but
    /// never stored.
    pub async fn lookup(&self, code: &str) -> Result<Product, ScraperError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ScraperError::MissingCode);
        }

        if let Some(cached) = self.store.read_through(code) {
            if !cached.is_empty() {
                tracing::info!("Serving {} from cache", code);
                return Ok(cached);
            }
        }

        let mut product = match self.source.scrape(code).await {
            Ok(product) => product,
            Err(e) => {
                match e.response_body() {
                    Some(body) => tracing::error!("Fetching {} failed: {}\n{}", code, e, body),
                    None => tracing::error!("Fetching {} failed: {}", code, e),
                }
                return Err(e.into());
            }
        };

        if product.is_storable() {
            product.mark_created(Utc::now());
            self.store.persist_durable(&product)?;
            self.store.refresh_cache(&product, self.ttl)?;
            tracing::info!("Stored {} ({})", code, product.name);
        } else {
            tracing::info!(
                "Nothing storable extracted for {} (name: {}, categories: {})",
                code,
                !product.name.is_empty(),
                product.categories.len()
            );
        }

        Ok(product)
    }
}
