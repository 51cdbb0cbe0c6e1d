//! Statistics over both storage tiers

use crate::storage::{now_millis, ProductStore, StorageResult};

/// Store statistics summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Number of durable product records
    pub durable_records: u64,

    /// Cache snapshots that have not yet expired
    pub live_cache_entries: u64,

    /// Cache snapshots past their expiry but not yet purged
    pub expired_cache_entries: u64,
}

/// Loads statistics from a store
///
/// # Arguments
///
/// * `store` - The storage backend to query
pub fn load_statistics(store: &dyn ProductStore) -> StorageResult<StoreStatistics> {
    let durable_records = store.count_records()?;
    let snapshots = store.count_snapshots(now_millis())?;

    Ok(StoreStatistics {
        durable_records,
        live_cache_entries: snapshots.live,
        expired_cache_entries: snapshots.expired,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Durable tier:");
    println!("  Product records: {}", stats.durable_records);
    println!();

    let total = stats.live_cache_entries + stats.expired_cache_entries;
    println!("Cache tier:");
    println!("  Live snapshots: {}", stats.live_cache_entries);
    println!("  Expired snapshots: {}", stats.expired_cache_entries);

    if total > 0 {
        let live_rate = (stats.live_cache_entries as f64 / total as f64) * 100.0;
        println!("  Live share: {:.1}%", live_rate);
    }

    if stats.expired_cache_entries > 0 {
        println!();
        println!("Run with --purge-expired to remove expired snapshots.");
    }
}
