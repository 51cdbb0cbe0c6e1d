//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ProductStore
//! trait. A single connection is guarded by a mutex so the store can be
//! shared between concurrent requests.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ProductStore, SnapshotCounts, StorageResult};
use crate::storage::ProductRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates a database file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(rusqlite::Error)` - Failed to open database
    pub fn new(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Statements are atomic, so a poisoned lock still guards a consistent connection
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProductStore for SqliteStore {
    // ===== Durable Tier =====

    fn write_record(&self, record: &ProductRecord) -> StorageResult<()> {
        self.conn().execute(
            "INSERT INTO products (asin, name, categories, ranks, dimensions, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(asin) DO UPDATE SET
                name = excluded.name,
                categories = excluded.categories,
                ranks = excluded.ranks,
                dimensions = excluded.dimensions,
                created_at = excluded.created_at",
            params![
                record.asin,
                record.name,
                record.categories,
                record.ranks,
                record.dimensions,
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn load_record(&self, code: &str) -> StorageResult<Option<ProductRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT asin, name, categories, ranks, dimensions, created_at
             FROM products WHERE asin = ?1",
        )?;

        let record = stmt
            .query_row(params![code], |row| {
                Ok(ProductRecord {
                    asin: row.get(0)?,
                    name: row.get(1)?,
                    categories: row.get(2)?,
                    ranks: row.get(3)?,
                    dimensions: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .optional()?;

        Ok(record)
    }

    fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Ephemeral Tier =====

    fn write_snapshot(&self, code: &str, snapshot: &str, expires_at: i64) -> StorageResult<()> {
        self.conn().execute(
            "INSERT INTO product_cache (asin, snapshot, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(asin) DO UPDATE SET
                snapshot = excluded.snapshot,
                expires_at = excluded.expires_at",
            params![code, snapshot, expires_at],
        )?;
        Ok(())
    }

    fn load_snapshot(&self, code: &str, now: i64) -> StorageResult<Option<String>> {
        let conn = self.conn();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT snapshot, expires_at FROM product_cache WHERE asin = ?1",
                params![code],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((snapshot, expires_at)) if expires_at > now => Ok(Some(snapshot)),
            Some(_) => {
                conn.execute(
                    "DELETE FROM product_cache WHERE asin = ?1 AND expires_at <= ?2",
                    params![code, now],
                )?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn purge_expired(&self, now: i64) -> StorageResult<u64> {
        let removed = self.conn().execute(
            "DELETE FROM product_cache WHERE expires_at <= ?1",
            params![now],
        )?;
        Ok(removed as u64)
    }

    fn count_snapshots(&self, now: i64) -> StorageResult<SnapshotCounts> {
        let (live, expired): (i64, i64) = self.conn().query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN expires_at > ?1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN expires_at <= ?1 THEN 1 ELSE 0 END), 0)
             FROM product_cache",
            params![now],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(SnapshotCounts {
            live: live as u64,
            expired: expired as u64,
        })
    }
}
