//! SQLite schema for the item store
//!
//! Items are partitioned by `type`; `(type, position)` is the ordering
//! key the reindexer maintains. Tag links cascade when an item is
//! deleted, tags themselves are never removed automatically.

use rusqlite::{Connection, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Items table (bookmarks and reading-list entries)
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            url TEXT NOT NULL,
            favicon_url TEXT,
            type TEXT NOT NULL DEFAULT 'bookmark'
                CHECK (type IN ('bookmark', 'reading-list')),
            starred INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            read INTEGER NOT NULL DEFAULT 0,
            position INTEGER NOT NULL DEFAULT 0 CHECK (position >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- Tags table (normalized)
        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL
        );

        -- Item-tag junction table (many-to-many)
        CREATE TABLE IF NOT EXISTS items_tags (
            item_id TEXT NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (item_id, tag_id),
            FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id)
        );

        -- Partition ordering
        CREATE INDEX IF NOT EXISTS idx_items_type_position ON items(type, position);

        -- Lookup by URL (extension lookup, import dedup)
        CREATE INDEX IF NOT EXISTS idx_items_url ON items(url);

        -- Fast tag lookups
        CREATE INDEX IF NOT EXISTS idx_items_tags_tag_id ON items_tags(tag_id);
        "#,
    )?;

    // Set schema version
    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}
