//! Item rows
//!
//! Row-level reads and writes for the `items` table. Nothing here keeps
//! partitions dense; callers pair these writes with the reindexer inside
//! one transaction.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::{Item, ItemType, ItemUpdate, Tag};
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::tags;

const ITEM_COLUMNS: &str = "id, title, url, favicon_url, type, starred, notes, read, position, \
                            created_at, updated_at";

/// Current time in the persisted timestamp format
pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

/// Format a timestamp as RFC 3339 UTC with millisecond precision
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Row to insert
pub struct ItemRecord<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub url: &'a str,
    pub favicon_url: Option<&'a str>,
    pub item_type: ItemType,
    pub notes: Option<&'a str>,
    pub position: i64,
    pub timestamp: &'a str,
}

/// Insert a new item row (not starred, unread)
pub fn insert(conn: &Connection, record: &ItemRecord<'_>) -> StoreResult<()> {
    conn.prepare_cached(
        r#"
        INSERT INTO items (id, title, url, favicon_url, type, starred, notes, read,
                           position, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 0, ?, 0, ?, ?, ?)
        "#,
    )?
    .execute(params![
        record.id,
        record.title,
        record.url,
        record.favicon_url,
        record.item_type.as_str(),
        record.notes,
        record.position,
        record.timestamp,
        record.timestamp,
    ])?;
    Ok(())
}

/// Check whether an item exists
pub fn exists(conn: &Connection, id: &str) -> StoreResult<bool> {
    let found = conn
        .prepare_cached("SELECT 1 FROM items WHERE id = ?")?
        .exists(params![id])?;
    Ok(found)
}

/// The partition an item currently belongs to
pub fn type_of(conn: &Connection, id: &str) -> StoreResult<Option<ItemType>> {
    let raw: Option<String> = conn
        .prepare_cached("SELECT type FROM items WHERE id = ?")?
        .query_row(params![id], |row| row.get(0))
        .optional()?;
    raw.map(|t| parse_type(&t)).transpose()
}

/// Resolve a list of ids to the ones that exist, with their types
///
/// Caller order is preserved and duplicate ids are collapsed.
pub fn existing_with_types(conn: &Connection, ids: &[Uuid]) -> StoreResult<Vec<(String, ItemType)>> {
    let mut seen = HashSet::new();
    let mut found = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.to_string();
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(item_type) = type_of(conn, &id)? {
            found.push((id, item_type));
        }
    }
    Ok(found)
}

/// Apply the scalar fields of a partial update (type and tags excluded)
///
/// Always bumps `updated_at`. Returns the number of rows touched.
pub fn update_fields(
    conn: &Connection,
    id: &str,
    update: &ItemUpdate,
    timestamp: &str,
) -> StoreResult<usize> {
    let mut set: Vec<&str> = Vec::new();
    let mut args: Vec<&dyn ToSql> = Vec::new();

    if let Some(ref title) = update.title {
        set.push("title = ?");
        args.push(title);
    }
    if let Some(ref url) = update.url {
        set.push("url = ?");
        args.push(url);
    }
    if let Some(ref favicon_url) = update.favicon_url {
        set.push("favicon_url = ?");
        args.push(favicon_url);
    }
    if let Some(ref starred) = update.starred {
        set.push("starred = ?");
        args.push(starred);
    }
    if let Some(ref notes) = update.notes {
        set.push("notes = ?");
        args.push(notes);
    }
    if let Some(ref read) = update.read {
        set.push("read = ?");
        args.push(read);
    }

    set.push("updated_at = ?");
    args.push(&timestamp);
    args.push(&id);

    let sql = format!("UPDATE items SET {} WHERE id = ?", set.join(", "));
    let touched = conn.execute(&sql, args.as_slice())?;
    Ok(touched)
}

/// Move an item into a partition at a given position
pub fn set_type_and_position(
    conn: &Connection,
    id: &str,
    item_type: ItemType,
    position: i64,
    timestamp: &str,
) -> StoreResult<usize> {
    let touched = conn
        .prepare_cached("UPDATE items SET type = ?, position = ?, updated_at = ? WHERE id = ?")?
        .execute(params![item_type.as_str(), position, timestamp, id])?;
    Ok(touched)
}

/// Set read state for one item
pub fn set_read(conn: &Connection, id: &str, read: bool, timestamp: &str) -> StoreResult<usize> {
    let touched = conn
        .prepare_cached("UPDATE items SET read = ?, updated_at = ? WHERE id = ?")?
        .execute(params![read, timestamp, id])?;
    Ok(touched)
}

/// Delete an item row and its tag links
pub fn delete(conn: &Connection, id: &str) -> StoreResult<usize> {
    tags::unlink_all(conn, id)?;
    let deleted = conn
        .prepare_cached("DELETE FROM items WHERE id = ?")?
        .execute(params![id])?;
    Ok(deleted)
}

/// URLs already present in a partition
pub fn urls_in(conn: &Connection, item_type: ItemType) -> StoreResult<HashSet<String>> {
    let mut stmt = conn.prepare_cached("SELECT url FROM items WHERE type = ?")?;
    let urls = stmt
        .query_map(params![item_type.as_str()], |row| row.get(0))?
        .collect::<Result<HashSet<String>, _>>()?;
    Ok(urls)
}

/// Highest position in a partition, `None` when empty
pub fn max_position(conn: &Connection, item_type: ItemType) -> StoreResult<Option<i64>> {
    let max = conn
        .prepare_cached("SELECT MAX(position) FROM items WHERE type = ?")?
        .query_row(params![item_type.as_str()], |row| row.get(0))?;
    Ok(max)
}

/// Number of items, optionally within one partition
pub fn count(conn: &Connection, item_type: Option<ItemType>) -> StoreResult<i64> {
    let n = match item_type {
        Some(t) => conn.query_row(
            "SELECT COUNT(*) FROM items WHERE type = ?",
            params![t.as_str()],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?,
    };
    Ok(n)
}

// ==================== Hydrated reads ====================

/// Fetch one item with its tags
pub fn get(conn: &Connection, id: &str) -> StoreResult<Option<Item>> {
    let sql = format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS);
    let row = conn
        .prepare_cached(&sql)?
        .query_row(params![id], ItemRow::from_row)
        .optional()?;

    match row {
        Some(row) => {
            let tags = tags::tags_for_item(conn, &row.id)?;
            Ok(Some(row.hydrate(tags)?))
        }
        None => Ok(None),
    }
}

/// Fetch the first item with an exact URL match, with its tags
pub fn find_by_url(conn: &Connection, url: &str) -> StoreResult<Option<Item>> {
    let sql = format!(
        "SELECT {} FROM items WHERE url = ? ORDER BY type, position LIMIT 1",
        ITEM_COLUMNS
    );
    let row = conn
        .prepare_cached(&sql)?
        .query_row(params![url], ItemRow::from_row)
        .optional()?;

    match row {
        Some(row) => {
            let tags = tags::tags_for_item(conn, &row.id)?;
            Ok(Some(row.hydrate(tags)?))
        }
        None => Ok(None),
    }
}

/// Query items with an optional filter clause, hydrating tags
///
/// `filter` is appended after `WHERE`; rows come back ordered by
/// partition then position.
pub fn query(conn: &Connection, filter: Option<&str>, args: &[&dyn ToSql]) -> StoreResult<Vec<Item>> {
    let sql = match filter {
        Some(clause) => format!(
            "SELECT {} FROM items WHERE {} ORDER BY type, position, id",
            ITEM_COLUMNS, clause
        ),
        None => format!("SELECT {} FROM items ORDER BY type, position, id", ITEM_COLUMNS),
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(args, ItemRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tag_map = tags::tags_by_item(conn)?;
    rows.into_iter()
        .map(|row| {
            let tags = tag_map.remove(&row.id).unwrap_or_default();
            row.hydrate(tags)
        })
        .collect()
}

// ==================== Internal structs ====================

struct ItemRow {
    id: String,
    title: String,
    url: String,
    favicon_url: Option<String>,
    item_type: String,
    starred: bool,
    notes: Option<String>,
    read: bool,
    position: i64,
    created_at: String,
    updated_at: String,
}

impl ItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            url: row.get(2)?,
            favicon_url: row.get(3)?,
            item_type: row.get(4)?,
            starred: row.get(5)?,
            notes: row.get(6)?,
            read: row.get(7)?,
            position: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn hydrate(self, tags: Vec<Tag>) -> StoreResult<Item> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| StoreError::InvalidData(format!("invalid item id '{}': {}", self.id, e)))?;

        Ok(Item {
            id,
            title: self.title,
            url: self.url,
            favicon_url: self.favicon_url,
            item_type: parse_type(&self.item_type)?,
            starred: self.starred,
            notes: self.notes,
            read: self.read,
            position: self.position,
            tags,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_type(raw: &str) -> StoreResult<ItemType> {
    raw.parse()
        .map_err(|_| StoreError::InvalidData(format!("unknown item type '{}'", raw)))
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("invalid timestamp '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::init_schema;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn insert_at(conn: &Connection, id: &Uuid, url: &str, item_type: ItemType, position: i64) {
        let ts = now_timestamp();
        let id = id.to_string();
        insert(
            conn,
            &ItemRecord {
                id: &id,
                title: "Title",
                url,
                favicon_url: None,
                item_type,
                notes: None,
                position,
                timestamp: &ts,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_insert_and_get() {
        let conn = setup();
        let id = Uuid::new_v4();
        insert_at(&conn, &id, "https://example.com", ItemType::ReadingList, 0);

        let item = get(&conn, &id.to_string()).unwrap().unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.url, "https://example.com");
        assert_eq!(item.item_type, ItemType::ReadingList);
        assert!(!item.read);
        assert!(!item.starred);
        assert!(item.tags.is_empty());
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let conn = setup();
        assert!(get(&conn, &Uuid::new_v4().to_string()).unwrap().is_none());
        assert!(type_of(&conn, "nope").unwrap().is_none());
    }

    #[test]
    fn test_update_fields_partial() {
        let conn = setup();
        let id = Uuid::new_v4();
        insert_at(&conn, &id, "https://example.com", ItemType::Bookmark, 0);

        let update = ItemUpdate {
            title: Some("New".to_string()),
            notes: Some(Some("hello".to_string())),
            starred: Some(true),
            ..Default::default()
        };
        let touched = update_fields(&conn, &id.to_string(), &update, "2030-01-01T00:00:00.000Z")
            .unwrap();
        assert_eq!(touched, 1);

        let item = get(&conn, &id.to_string()).unwrap().unwrap();
        assert_eq!(item.title, "New");
        assert_eq!(item.url, "https://example.com");
        assert_eq!(item.notes.as_deref(), Some("hello"));
        assert!(item.starred);
        assert_eq!(format_timestamp(&item.updated_at), "2030-01-01T00:00:00.000Z");

        let clear = ItemUpdate {
            notes: Some(None),
            ..Default::default()
        };
        update_fields(&conn, &id.to_string(), &clear, &now_timestamp()).unwrap();
        assert!(get(&conn, &id.to_string()).unwrap().unwrap().notes.is_none());
    }

    #[test]
    fn test_existing_with_types_filters_and_dedupes() {
        let conn = setup();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        insert_at(&conn, &a, "https://a.com", ItemType::Bookmark, 0);
        insert_at(&conn, &b, "https://b.com", ItemType::ReadingList, 0);

        let found = existing_with_types(&conn, &[b, Uuid::new_v4(), a, b]).unwrap();
        assert_eq!(
            found,
            vec![
                (b.to_string(), ItemType::ReadingList),
                (a.to_string(), ItemType::Bookmark)
            ]
        );
    }

    #[test]
    fn test_urls_and_max_position() {
        let conn = setup();
        assert_eq!(max_position(&conn, ItemType::ReadingList).unwrap(), None);

        insert_at(&conn, &Uuid::new_v4(), "https://a.com", ItemType::ReadingList, 0);
        insert_at(&conn, &Uuid::new_v4(), "https://b.com", ItemType::ReadingList, 1);
        insert_at(&conn, &Uuid::new_v4(), "https://c.com", ItemType::Bookmark, 0);

        let urls = urls_in(&conn, ItemType::ReadingList).unwrap();
        assert!(urls.contains("https://a.com"));
        assert!(!urls.contains("https://c.com"));
        assert_eq!(max_position(&conn, ItemType::ReadingList).unwrap(), Some(1));
        assert_eq!(count(&conn, None).unwrap(), 3);
        assert_eq!(count(&conn, Some(ItemType::Bookmark)).unwrap(), 1);
    }

    #[test]
    fn test_query_orders_by_type_then_position() {
        let conn = setup();
        let r1 = Uuid::new_v4();
        let r0 = Uuid::new_v4();
        let b0 = Uuid::new_v4();
        insert_at(&conn, &r1, "https://r1.com", ItemType::ReadingList, 1);
        insert_at(&conn, &r0, "https://r0.com", ItemType::ReadingList, 0);
        insert_at(&conn, &b0, "https://b0.com", ItemType::Bookmark, 0);

        let items = query(&conn, None, &[]).unwrap();
        let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![b0, r0, r1]);

        let rl = query(&conn, Some("type = ?"), &[&"reading-list"]).unwrap();
        assert_eq!(rl.len(), 2);
    }

    #[test]
    fn test_find_by_url() {
        let conn = setup();
        let id = Uuid::new_v4();
        insert_at(&conn, &id, "https://found.com", ItemType::Bookmark, 0);
        tags::link_names(&conn, &id.to_string(), &["web".to_string()]).unwrap();

        let item = find_by_url(&conn, "https://found.com").unwrap().unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.tag_names(), vec!["web"]);
        assert!(find_by_url(&conn, "https://missing.com").unwrap().is_none());
    }

    #[test]
    fn test_delete_removes_links() {
        let conn = setup();
        let id = Uuid::new_v4();
        insert_at(&conn, &id, "https://a.com", ItemType::Bookmark, 0);
        tags::link_names(&conn, &id.to_string(), &["x".to_string()]).unwrap();

        assert_eq!(delete(&conn, &id.to_string()).unwrap(), 1);
        assert_eq!(delete(&conn, &id.to_string()).unwrap(), 0);
        assert!(tags::tags_for_item(&conn, &id.to_string()).unwrap().is_empty());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T12:30:45.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(&ts), "2024-05-01T12:30:45.123Z");
        assert!(now_timestamp().ends_with('Z'));
    }
}
