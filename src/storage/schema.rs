//! Database schema definitions
//!
//! This module contains the SQL schema for the product database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Durable tier: one flat row per product code
CREATE TABLE IF NOT EXISTS products (
    asin TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    categories TEXT NOT NULL,
    ranks TEXT NOT NULL DEFAULT '',
    dimensions TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT ''
);

-- Ephemeral tier: serialized snapshots with an expiry (Unix milliseconds)
CREATE TABLE IF NOT EXISTS product_cache (
    asin TEXT PRIMARY KEY NOT NULL,
    snapshot TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_product_cache_expires ON product_cache(expires_at);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_creation() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"products".to_string()));
        assert!(tables.contains(&"product_cache".to_string()));
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
    }
}
