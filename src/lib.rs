//! dp-scraper: a cached product page extractor
//!
//! This crate fetches a single product detail page for a product code,
//! extracts a fixed set of fields from whichever page layout the source
//! served, and keeps the result in a durable record plus a short-lived
//! cache snapshot so repeated lookups do not hit the source again.

pub mod api;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod product;
pub mod storage;

use thiserror::Error;

/// Main error type for dp-scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("missing product code in request")]
    MissingCode,

    #[error(transparent)]
    Fetch(#[from] fetch::FetchError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for dp-scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{normalize, Extractor};
pub use fetch::{FetchController, Throttle};
pub use pipeline::{ProductScraper, ProductService, ProductSource, DEFAULT_TTL};
pub use product::{Product, ProductView};
pub use storage::{ProductStore, SqliteStore};
