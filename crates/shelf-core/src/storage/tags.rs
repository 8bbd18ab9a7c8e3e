//! Tag resolution and item-tag links
//!
//! `resolve` is the single get-or-create entry point for tag names. It
//! inserts with `ON CONFLICT DO NOTHING` and then selects by name, so two
//! writers resolving the same brand-new name race on the insert, exactly
//! one row is created by the unique constraint, and both selects return it.
//!
//! All functions take a `&Connection`; a `Transaction` derefs to one, so
//! they compose inside the store's mutation transactions.

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use crate::models::Tag;
use crate::storage::error::StoreResult;

/// Outcome of reconciling an item's links against a wanted set of names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Get or create a tag by (already normalized) name, returning its id
pub fn resolve(conn: &Connection, name: &str) -> StoreResult<i64> {
    conn.prepare_cached("INSERT INTO tags (name) VALUES (?) ON CONFLICT(name) DO NOTHING")?
        .execute(params![name])?;
    let id = conn
        .prepare_cached("SELECT id FROM tags WHERE name = ?")?
        .query_row(params![name], |row| row.get(0))?;
    Ok(id)
}

/// Find a tag id by name without creating it
pub fn find(conn: &Connection, name: &str) -> StoreResult<Option<i64>> {
    let id = conn
        .prepare_cached("SELECT id FROM tags WHERE name = ?")?
        .query_row(params![name], |row| row.get(0))
        .optional()?;
    Ok(id)
}

/// Link an item to a tag; returns false if the link already existed
pub fn link(conn: &Connection, item_id: &str, tag_id: i64) -> StoreResult<bool> {
    let inserted = conn
        .prepare_cached(
            "INSERT INTO items_tags (item_id, tag_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
        )?
        .execute(params![item_id, tag_id])?;
    Ok(inserted > 0)
}

/// Remove one item-tag link; returns false if it was not present
pub fn unlink(conn: &Connection, item_id: &str, tag_id: i64) -> StoreResult<bool> {
    let deleted = conn
        .prepare_cached("DELETE FROM items_tags WHERE item_id = ? AND tag_id = ?")?
        .execute(params![item_id, tag_id])?;
    Ok(deleted > 0)
}

/// Remove every link for an item
pub fn unlink_all(conn: &Connection, item_id: &str) -> StoreResult<usize> {
    let deleted = conn
        .prepare_cached("DELETE FROM items_tags WHERE item_id = ?")?
        .execute(params![item_id])?;
    Ok(deleted)
}

/// Resolve every name and link it to the item
pub fn link_names(conn: &Connection, item_id: &str, names: &[String]) -> StoreResult<()> {
    for name in names {
        let tag_id = resolve(conn, name)?;
        link(conn, item_id, tag_id)?;
    }
    Ok(())
}

/// Reconcile an item's links with `wanted` as a diff
///
/// Links present in both sets are left untouched (never deleted and
/// re-inserted). Missing tags are created; tags that lose their last
/// link are kept.
pub fn sync_item_tags(conn: &Connection, item_id: &str, wanted: &[String]) -> StoreResult<TagDiff> {
    let existing = tags_for_item(conn, item_id)?;

    let mut wanted_ids = Vec::with_capacity(wanted.len());
    for name in wanted {
        wanted_ids.push((resolve(conn, name)?, name));
    }

    let mut diff = TagDiff::default();

    for tag in &existing {
        if !wanted_ids.iter().any(|(id, _)| *id == tag.id) {
            unlink(conn, item_id, tag.id)?;
            diff.removed.push(tag.name.clone());
        }
    }

    for (tag_id, name) in wanted_ids {
        if !existing.iter().any(|t| t.id == tag_id) {
            link(conn, item_id, tag_id)?;
            diff.added.push(name.clone());
        }
    }

    Ok(diff)
}

/// Tags linked to one item, sorted by name
pub fn tags_for_item(conn: &Connection, item_id: &str) -> StoreResult<Vec<Tag>> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT t.id, t.name FROM tags t
        JOIN items_tags it ON t.id = it.tag_id
        WHERE it.item_id = ?
        ORDER BY t.name
        "#,
    )?;

    let tags = stmt
        .query_map(params![item_id], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Tags for every linked item, keyed by item id, each list sorted by name
pub fn tags_by_item(conn: &Connection) -> StoreResult<HashMap<String, Vec<Tag>>> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT it.item_id, t.id, t.name FROM items_tags it
        JOIN tags t ON t.id = it.tag_id
        ORDER BY it.item_id, t.name
        "#,
    )?;

    let mut map: HashMap<String, Vec<Tag>> = HashMap::new();
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            Tag {
                id: row.get(1)?,
                name: row.get(2)?,
            },
        ))
    })?;
    for row in rows {
        let (item_id, tag) = row?;
        map.entry(item_id).or_default().push(tag);
    }
    Ok(map)
}

/// All tags with their usage counts, most used first
pub fn tags_with_counts(conn: &Connection) -> StoreResult<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT t.name, COUNT(it.item_id) as count
        FROM tags t
        LEFT JOIN items_tags it ON t.id = it.tag_id
        GROUP BY t.id
        ORDER BY count DESC, t.name
        "#,
    )?;

    let tags = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<(String, i64)>, _>>()?;
    Ok(tags)
}
