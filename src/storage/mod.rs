//! Storage module for product records
//!
//! This module keeps extracted products in two tiers:
//! - A durable record per product code, overwritten on every successful fetch
//! - A short-lived cache snapshot per code that spares repeat fetches
//!
//! Both tiers live in one SQLite database.

mod record;
mod schema;
mod sqlite;
mod stats;
mod traits;

pub use record::{ProductRecord, LIST_SEPARATOR};
pub use sqlite::SqliteStore;
pub use stats::{load_statistics, print_statistics, StoreStatistics};
pub use traits::{now_millis, ProductStore, SnapshotCounts, StorageError, StorageResult};

use std::path::Path;

/// Opens or creates the product database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to open the database
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    Ok(SqliteStore::new(path)?)
}
