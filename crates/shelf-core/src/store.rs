//! Unified storage interface
//!
//! The `Store` owns one SQLite connection and exposes every operation on
//! items and tags. Each mutation runs inside a single `BEGIN IMMEDIATE`
//! transaction: item/tag writes first, then a renumber of every partition
//! the change touched, then commit. Any `?` exit drops the transaction
//! uncommitted, which rolls the whole operation back.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! let id = store.create_item(NewItem::new("Rust", "https://rust-lang.org"))?;
//! store.reorder_item(id, ItemType::Bookmark, 3)?;
//!
//! for item in store.list_items()? {
//!     println!("{} {}", item.position, item.title);
//! }
//! ```

use std::collections::BTreeSet;

use anyhow::Context;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{
    normalize_tag_names, ImportEntry, ImportSummary, Item, ItemType, ItemUpdate, NewItem,
};
use crate::storage::error::{StoreError, StoreResult};
use crate::storage::items::{self, ItemRecord};
use crate::storage::{connection, reindex, tags};

/// Storage interface for bookmarks and the reading list
pub struct Store {
    conn: Connection,
    config: Config,
}

impl Store {
    /// Open the store at the configured location
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config).context("Failed to open database")
    }

    /// Open the store with a specific configuration
    ///
    /// Creates the data directory and database file on first use.
    pub fn open_with_config(config: Config) -> StoreResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|source| StoreError::Io {
            path: config.data_dir.clone(),
            source,
        })?;
        let conn = connection::open_file(&config.sqlite_path())?;
        Ok(Self { conn, config })
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: connection::open_in_memory()?,
            config: Config::default(),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct access to the underlying connection (diagnostics, tests)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a write transaction, taking the write lock up front
    fn begin(&mut self) -> StoreResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    // ==================== Item Mutations ====================

    /// Create an item at the head of its list
    ///
    /// Every existing item in the target partition shifts down one slot.
    pub fn create_item(&mut self, new: NewItem) -> StoreResult<Uuid> {
        let title = new.title.trim();
        let url = new.url.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("title is required".to_string()));
        }
        if url.is_empty() {
            return Err(StoreError::Validation("url is required".to_string()));
        }

        let id = new.id.unwrap_or_else(Uuid::new_v4);
        let id_str = id.to_string();
        let tag_names = normalize_tag_names(&new.tag_names);
        let timestamp = items::now_timestamp();

        let tx = self.begin()?;
        if items::exists(&tx, &id_str)? {
            return Err(StoreError::Validation(format!("item {} already exists", id)));
        }

        reindex::shift(&tx, new.item_type, 1)?;
        items::insert(
            &tx,
            &ItemRecord {
                id: &id_str,
                title,
                url,
                favicon_url: new.favicon_url.as_deref(),
                item_type: new.item_type,
                notes: new.notes.as_deref(),
                position: 0,
                timestamp: &timestamp,
            },
        )?;
        tags::link_names(&tx, &id_str, &tag_names)?;
        tx.commit()?;

        info!(item_id = %id, item_type = %new.item_type, tags = tag_names.len(), "created item");
        Ok(id)
    }

    /// Apply a partial update
    ///
    /// A type change moves the item to the head of the new list and
    /// closes the gap it left in the old one. Tag names, when given,
    /// are reconciled as a diff so unchanged links are never rewritten.
    pub fn update_item(&mut self, id: Uuid, update: ItemUpdate) -> StoreResult<()> {
        if matches!(update.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(StoreError::Validation("title cannot be empty".to_string()));
        }
        if matches!(update.url.as_deref(), Some(u) if u.trim().is_empty()) {
            return Err(StoreError::Validation("url cannot be empty".to_string()));
        }

        let id_str = id.to_string();
        let timestamp = items::now_timestamp();

        let tx = self.begin()?;
        let current_type = items::type_of(&tx, &id_str)?.ok_or(StoreError::NotFound { id })?;
        if update.is_empty() {
            return Ok(());
        }

        items::update_fields(&tx, &id_str, &update, &timestamp)?;

        if let Some(new_type) = update.item_type.filter(|t| *t != current_type) {
            reindex::shift(&tx, new_type, 1)?;
            // Row must leave the old partition before it is renumbered
            items::set_type_and_position(&tx, &id_str, new_type, 0, &timestamp)?;
            reindex::renumber(&tx, current_type)?;
            info!(item_id = %id, from = %current_type, to = %new_type, "moved item to other list");
        }

        if let Some(ref names) = update.tag_names {
            let diff = tags::sync_item_tags(&tx, &id_str, &normalize_tag_names(names))?;
            if !diff.is_empty() {
                debug!(item_id = %id, added = ?diff.added, removed = ?diff.removed, "updated tags");
            }
        }

        tx.commit()?;
        info!(item_id = %id, "updated item");
        Ok(())
    }

    /// Delete an item and close the gap in its list
    ///
    /// Returns false when the item did not exist.
    pub fn delete_item(&mut self, id: Uuid) -> StoreResult<bool> {
        let id_str = id.to_string();

        let tx = self.begin()?;
        let Some(item_type) = items::type_of(&tx, &id_str)? else {
            debug!(item_id = %id, "delete of missing item ignored");
            return Ok(false);
        };

        items::delete(&tx, &id_str)?;
        reindex::renumber(&tx, item_type)?;
        tx.commit()?;

        info!(item_id = %id, item_type = %item_type, "deleted item");
        Ok(true)
    }

    /// Move an item to `position` within `item_type`'s list
    ///
    /// Out-of-range positions clamp to the ends. Returns false (and
    /// writes nothing) when the item is not in that list.
    pub fn reorder_item(&mut self, id: Uuid, item_type: ItemType, position: i64) -> StoreResult<bool> {
        let tx = self.begin()?;
        let Some(written) = reindex::reorder(&tx, item_type, &id.to_string(), position)? else {
            debug!(item_id = %id, item_type = %item_type, "reorder of item outside list ignored");
            return Ok(false);
        };
        tx.commit()?;

        info!(item_id = %id, item_type = %item_type, position, written, "reordered item");
        Ok(true)
    }

    /// Set the read flag on one item
    pub fn toggle_read(&mut self, id: Uuid, read: bool) -> StoreResult<()> {
        let timestamp = items::now_timestamp();
        let tx = self.begin()?;
        if items::set_read(&tx, &id.to_string(), read, &timestamp)? == 0 {
            return Err(StoreError::NotFound { id });
        }
        tx.commit()?;

        info!(item_id = %id, read, "set read state");
        Ok(())
    }

    // ==================== Bulk Mutations ====================

    /// Delete many items, renumbering each affected list once
    ///
    /// Returns the number of items actually deleted.
    pub fn bulk_delete(&mut self, ids: &[Uuid]) -> StoreResult<usize> {
        let tx = self.begin()?;
        let targets = items::existing_with_types(&tx, ids)?;
        if targets.is_empty() {
            return Ok(0);
        }

        let affected: BTreeSet<ItemType> = targets.iter().map(|(_, t)| *t).collect();
        for (id, _) in &targets {
            items::delete(&tx, id)?;
        }
        for item_type in &affected {
            reindex::renumber(&tx, *item_type)?;
        }
        tx.commit()?;

        info!(deleted = targets.len(), partitions = affected.len(), "bulk deleted items");
        Ok(targets.len())
    }

    /// Move many items to the head of `new_type`'s list
    ///
    /// Items land at `0..k-1` in the order given. Returns the number of
    /// items moved.
    pub fn bulk_move(&mut self, ids: &[Uuid], new_type: ItemType) -> StoreResult<usize> {
        let timestamp = items::now_timestamp();

        let tx = self.begin()?;
        let targets = items::existing_with_types(&tx, ids)?;
        if targets.is_empty() {
            return Ok(0);
        }

        let sources: BTreeSet<ItemType> = targets
            .iter()
            .map(|(_, t)| *t)
            .filter(|t| *t != new_type)
            .collect();
        let already_in_destination = targets.iter().any(|(_, t)| *t == new_type);

        reindex::shift(&tx, new_type, targets.len() as i64)?;
        for (index, (id, _)) in targets.iter().enumerate() {
            items::set_type_and_position(&tx, id, new_type, index as i64, &timestamp)?;
        }
        for item_type in &sources {
            reindex::renumber(&tx, *item_type)?;
        }
        if already_in_destination {
            // Moved rows left holes behind them in the shifted range
            reindex::renumber(&tx, new_type)?;
        }
        tx.commit()?;

        info!(moved = targets.len(), to = %new_type, "bulk moved items");
        Ok(targets.len())
    }

    /// Link every tag name to every item
    ///
    /// Existing links are left alone. Returns the number of new links.
    pub fn bulk_tag(&mut self, ids: &[Uuid], tag_names: &[String]) -> StoreResult<usize> {
        let names = normalize_tag_names(tag_names);

        let tx = self.begin()?;
        let targets = items::existing_with_types(&tx, ids)?;
        if targets.is_empty() || names.is_empty() {
            return Ok(0);
        }

        let mut linked = 0;
        for name in &names {
            let tag_id = tags::resolve(&tx, name)?;
            for (id, _) in &targets {
                if tags::link(&tx, id, tag_id)? {
                    linked += 1;
                }
            }
        }
        tx.commit()?;

        info!(items = targets.len(), tags = ?names, linked, "bulk tagged items");
        Ok(linked)
    }

    /// Set the read flag on many items
    ///
    /// Returns the number of items updated.
    pub fn bulk_mark_read(&mut self, ids: &[Uuid], read: bool) -> StoreResult<usize> {
        let timestamp = items::now_timestamp();

        let tx = self.begin()?;
        let targets = items::existing_with_types(&tx, ids)?;
        for (id, _) in &targets {
            items::set_read(&tx, id, read, &timestamp)?;
        }
        tx.commit()?;

        info!(items = targets.len(), read, "bulk set read state");
        Ok(targets.len())
    }

    /// Append imported entries to the end of the reading list
    ///
    /// Urls already on the reading list (or repeated within `entries`)
    /// are skipped, as are entries without a url.
    pub fn import_bookmarks(&mut self, entries: &[ImportEntry]) -> StoreResult<ImportSummary> {
        let item_type = ItemType::ReadingList;
        let timestamp = items::now_timestamp();

        let tx = self.begin()?;
        let mut seen = items::urls_in(&tx, item_type)?;
        let mut next = items::max_position(&tx, item_type)?.map_or(0, |p| p + 1);
        let mut summary = ImportSummary::default();

        for entry in entries {
            let url = entry.url.trim();
            if url.is_empty() {
                debug!(title = %entry.title, "skipping import entry without url");
                continue;
            }
            if !seen.insert(url.to_string()) {
                continue;
            }

            let title = match entry.title.trim() {
                "" => url,
                t => t,
            };
            let id = Uuid::new_v4().to_string();
            items::insert(
                &tx,
                &ItemRecord {
                    id: &id,
                    title,
                    url,
                    favicon_url: None,
                    item_type,
                    notes: None,
                    position: next,
                    timestamp: &timestamp,
                },
            )?;
            tags::link_names(&tx, &id, &normalize_tag_names(&entry.tags))?;

            next += 1;
            summary.imported += 1;
        }
        tx.commit()?;

        info!(
            received = entries.len(),
            imported = summary.imported,
            "imported bookmarks"
        );
        Ok(summary)
    }

    // ==================== Tag Mutations ====================

    /// Add one tag to an item; returns false if it was already linked
    pub fn tag_item(&mut self, id: Uuid, name: &str) -> StoreResult<bool> {
        let Some(name) = normalize_tag_names([name]).pop() else {
            return Err(StoreError::Validation("tag name cannot be empty".to_string()));
        };
        let id_str = id.to_string();

        let tx = self.begin()?;
        if !items::exists(&tx, &id_str)? {
            return Err(StoreError::NotFound { id });
        }
        let tag_id = tags::resolve(&tx, &name)?;
        let linked = tags::link(&tx, &id_str, tag_id)?;
        tx.commit()?;

        debug!(item_id = %id, tag = %name, linked, "tagged item");
        Ok(linked)
    }

    /// Remove one tag from an item; returns false if it was not linked
    ///
    /// The tag itself is kept even when no item uses it anymore.
    pub fn untag_item(&mut self, id: Uuid, name: &str) -> StoreResult<bool> {
        let Some(name) = normalize_tag_names([name]).pop() else {
            return Ok(false);
        };

        let tx = self.begin()?;
        let Some(tag_id) = tags::find(&tx, &name)? else {
            return Ok(false);
        };
        let removed = tags::unlink(&tx, &id.to_string(), tag_id)?;
        tx.commit()?;

        debug!(item_id = %id, tag = %name, removed, "untagged item");
        Ok(removed)
    }

    // ==================== Maintenance ====================

    /// Renumber every list newest-first by creation time
    ///
    /// For databases whose positions were written by another tool.
    /// Returns the rows rewritten per list.
    pub fn repair_positions(&mut self) -> StoreResult<Vec<(ItemType, usize)>> {
        let tx = self.begin()?;
        let mut written = Vec::with_capacity(ItemType::ALL.len());
        for item_type in ItemType::ALL {
            written.push((item_type, reindex::repair(&tx, item_type)?));
        }
        tx.commit()?;

        for (item_type, rows) in &written {
            if *rows > 0 {
                warn!(item_type = %item_type, rows, "repaired positions");
            }
        }
        Ok(written)
    }

    /// Lists whose positions are not exactly `0..n-1`
    pub fn check_density(&self) -> StoreResult<Vec<ItemType>> {
        let mut broken = Vec::new();
        for item_type in ItemType::ALL {
            if !reindex::is_dense(&self.conn, item_type)? {
                broken.push(item_type);
            }
        }
        Ok(broken)
    }

    // ==================== Queries ====================

    /// All items with tags, bookmarks first, each list by position
    pub fn list_items(&self) -> StoreResult<Vec<Item>> {
        items::query(&self.conn, None, &[])
    }

    /// One list's items by position
    pub fn list_partition(&self, item_type: ItemType) -> StoreResult<Vec<Item>> {
        items::query(&self.conn, Some("type = ?"), params![item_type.as_str()])
    }

    /// Items carrying a tag, bookmarks first, each list by position
    pub fn list_items_by_tag(&self, tag_name: &str) -> StoreResult<Vec<Item>> {
        let name = tag_name.trim().to_lowercase();
        items::query(
            &self.conn,
            Some(
                "id IN (SELECT it.item_id FROM items_tags it \
                 JOIN tags t ON t.id = it.tag_id WHERE t.name = ?)",
            ),
            params![name],
        )
    }

    /// Get an item by id
    pub fn get_item(&self, id: Uuid) -> StoreResult<Option<Item>> {
        items::get(&self.conn, &id.to_string())
    }

    /// Find a saved item by exact url
    pub fn lookup_by_url(&self, url: &str) -> StoreResult<Option<Item>> {
        items::find_by_url(&self.conn, url.trim())
    }

    /// All tags with usage counts, most used first
    pub fn tags_with_counts(&self) -> StoreResult<Vec<(String, i64)>> {
        tags::tags_with_counts(&self.conn)
    }

    /// Count items, optionally in one list
    pub fn count_items(&self, item_type: Option<ItemType>) -> StoreResult<i64> {
        items::count(&self.conn, item_type)
    }
}
