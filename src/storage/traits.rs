//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types. Backends implement a handful of primitives; the
//! cache-aside operations and their validation rules are provided methods so
//! every backend behaves the same way.

use crate::product::Product;
use crate::storage::ProductRecord;
use chrono::Utc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing product code in request")]
    MissingCode,

    #[error("missing product name")]
    MissingName,

    #[error("missing product category")]
    MissingCategory,

    #[error("missing TTL duration")]
    MissingTtl,

    #[error("product is empty")]
    EmptyProduct,

    #[error("product key: product:{0} doesn't exist")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Number of snapshot rows on either side of their expiry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotCounts {
    pub live: u64,
    pub expired: u64,
}

/// Current wall-clock time as Unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Trait for storage backend implementations
///
/// Two tiers live behind it: the durable record (one flat row per product
/// code, overwritten on every successful fetch) and the ephemeral cache (one
/// serialized snapshot per code with an expiry). Implementations must be
/// safe to share between concurrent requests.
pub trait ProductStore: Send + Sync {
    // ===== Durable Tier =====

    /// Overwrites the durable record for `record.asin`
    fn write_record(&self, record: &ProductRecord) -> StorageResult<()>;

    /// Loads the durable record for a code
    fn load_record(&self, code: &str) -> StorageResult<Option<ProductRecord>>;

    /// Counts durable records
    fn count_records(&self) -> StorageResult<u64>;

    // ===== Ephemeral Tier =====

    /// Stores a snapshot that expires at `expires_at` (Unix milliseconds)
    fn write_snapshot(&self, code: &str, snapshot: &str, expires_at: i64) -> StorageResult<()>;

    /// Loads a snapshot that has not expired at `now` (Unix milliseconds)
    ///
    /// An expired snapshot is a normal miss.
    fn load_snapshot(&self, code: &str, now: i64) -> StorageResult<Option<String>>;

    /// Deletes every snapshot expired at `now`, returning how many were removed
    fn purge_expired(&self, now: i64) -> StorageResult<u64>;

    /// Counts live and expired snapshots at `now`
    fn count_snapshots(&self, now: i64) -> StorageResult<SnapshotCounts>;

    // ===== Cache-Aside Operations =====

    /// Looks up the cached snapshot for a code
    ///
    /// Never fails: a missing, expired or unreadable snapshot is a miss, and
    /// the caller falls through to fetching.
    fn read_through(&self, code: &str) -> Option<Product> {
        if code.is_empty() {
            return None;
        }

        let snapshot = match self.load_snapshot(code, now_millis()) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::debug!("Cache miss for {}", code);
                return None;
            }
            Err(e) => {
                tracing::warn!("Cache read for {} failed, treating as miss: {}", code, e);
                return None;
            }
        };

        match serde_json::from_str::<Product>(&snapshot) {
            Ok(product) => {
                tracing::debug!("Cache hit for {}", code);
                Some(product)
            }
            Err(e) => {
                tracing::warn!("Cached snapshot for {} is unreadable: {}", code, e);
                None
            }
        }
    }

    /// Writes the durable record for a product, replacing any previous one
    ///
    /// # Errors
    ///
    /// `MissingCode`, `MissingName` and `MissingCategory`, checked in that order.
    fn persist_durable(&self, product: &Product) -> StorageResult<()> {
        if product.code.is_empty() {
            return Err(StorageError::MissingCode);
        }
        if product.name.is_empty() {
            return Err(StorageError::MissingName);
        }
        if product.categories.is_empty() {
            return Err(StorageError::MissingCategory);
        }

        self.write_record(&ProductRecord::from(product))
    }

    /// Stores a snapshot of the full product in the cache for `ttl`
    ///
    /// # Errors
    ///
    /// `MissingCode` for an empty code, `EmptyProduct` for an empty name and
    /// `MissingTtl` for a zero TTL.
    fn refresh_cache(&self, product: &Product, ttl: Duration) -> StorageResult<()> {
        if product.code.is_empty() {
            return Err(StorageError::MissingCode);
        }
        if product.is_empty() {
            return Err(StorageError::EmptyProduct);
        }
        if ttl.is_zero() {
            return Err(StorageError::MissingTtl);
        }

        let snapshot = serde_json::to_string(product)?;
        self.write_snapshot(&product.code, &snapshot, expiry_after(now_millis(), ttl))
    }

    /// Reads the durable record for a code
    ///
    /// # Errors
    ///
    /// `MissingCode` for an empty code, `NotFound` when no record exists.
    fn read_durable(&self, code: &str) -> StorageResult<Product> {
        if code.is_empty() {
            return Err(StorageError::MissingCode);
        }

        match self.load_record(code)? {
            Some(record) => record.into_product(),
            None => Err(StorageError::NotFound(code.to_string())),
        }
    }
}

/// Expiry in Unix milliseconds for a snapshot written at `now`
///
/// Partial milliseconds round up, so any non-zero TTL outlives the write.
fn expiry_after(now: i64, ttl: Duration) -> i64 {
    let ttl_ms = (ttl.as_nanos() + 999_999) / 1_000_000;
    now.saturating_add(i64::try_from(ttl_ms).unwrap_or(i64::MAX))
}
