//! Shelf Core Library
//!
//! This crate provides the core functionality for shelf, a local
//! bookmark and reading-list manager backed by SQLite.
//!
//! # Architecture
//!
//! Every item lives in one of two lists (`ItemType::Bookmark` or
//! `ItemType::ReadingList`). Each list keeps a dense `0..n-1` position
//! ordering, and every mutation on `Store` runs in one transaction that
//! restores that ordering before it commits.
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! let id = store.create_item(
//!     NewItem::new("Example", "https://example.com").with_type(ItemType::ReadingList),
//! )?;
//! store.reorder_item(id, ItemType::ReadingList, 2)?;
//!
//! let items = store.list_partition(ItemType::ReadingList)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Items, tags and operation inputs
//! - `storage`: SQLite schema, row access, tag resolution, reindexing
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{
    normalize_tag_names, ImportEntry, ImportSummary, Item, ItemType, ItemUpdate, NewItem, Tag,
};
pub use storage::{StoreError, StoreResult, TagDiff};
pub use store::Store;
