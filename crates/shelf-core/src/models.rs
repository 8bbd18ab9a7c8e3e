//! Data models for shelf
//!
//! Defines the core data structures: Item, Tag and the list partitions
//! (`ItemType`) that items are ordered within, plus the input shapes
//! accepted by the mutation operations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::error::StoreError;

/// The list an item belongs to
///
/// Each variant is a separate partition with its own dense
/// `0..n-1` position ordering.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    /// Long-lived bookmarks
    #[default]
    Bookmark,
    /// Things to read, with read/unread state
    ReadingList,
}

impl ItemType {
    /// Every partition, in listing order
    pub const ALL: [ItemType; 2] = [ItemType::Bookmark, ItemType::ReadingList];

    /// Storage and wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Bookmark => "bookmark",
            ItemType::ReadingList => "reading-list",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bookmark" | "bookmarks" => Ok(ItemType::Bookmark),
            "reading-list" | "reading_list" | "readinglist" => Ok(ItemType::ReadingList),
            other => Err(StoreError::Validation(format!(
                "unknown item type '{}' (expected 'bookmark' or 'reading-list')",
                other
            ))),
        }
    }
}

/// A tag attached to items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A saved bookmark or reading-list entry, hydrated with its tags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier
    pub id: Uuid,
    /// Display title (may be empty)
    pub title: String,
    /// The URL
    pub url: String,
    /// Favicon URL, when known
    pub favicon_url: Option<String>,
    /// Partition this item is ordered within
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Starred flag
    pub starred: bool,
    /// Free-form notes
    pub notes: Option<String>,
    /// Read state (meaningful for reading-list items)
    pub read: bool,
    /// Zero-based position within the partition
    pub position: i64,
    /// Tags, sorted by name
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Tag names in display order
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Input for creating an item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    /// Caller-generated id; a fresh v4 UUID is used when absent
    pub id: Option<Uuid>,
    pub title: String,
    pub url: String,
    pub tag_names: Vec<String>,
    pub favicon_url: Option<String>,
    pub item_type: ItemType,
    pub notes: Option<String>,
}

impl NewItem {
    /// Create a bookmark input with the given title and URL
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_names = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_favicon(mut self, favicon_url: impl Into<String>) -> Self {
        self.favicon_url = Some(favicon_url.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of an item; `None` leaves a field untouched
///
/// `favicon_url` and `notes` are doubly optional: `Some(None)` clears
/// the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub favicon_url: Option<Option<String>>,
    pub item_type: Option<ItemType>,
    pub starred: Option<bool>,
    pub notes: Option<Option<String>>,
    pub read: Option<bool>,
    pub tag_names: Option<Vec<String>>,
}

impl ItemUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One pre-parsed entry from a bookmarks export
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportEntry {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Result of an import
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportSummary {
    /// Items actually inserted, after deduplication
    pub imported: usize,
}

/// Normalize tag names: trim, lower-case, drop empties and duplicates
///
/// First occurrence wins, so caller ordering is preserved.
pub fn normalize_tag_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref().trim().to_lowercase();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
