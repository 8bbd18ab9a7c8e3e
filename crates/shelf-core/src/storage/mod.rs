//! Storage layer
//!
//! SQLite is the single source of truth. The submodules split the work
//! the way a mutation uses it:
//!
//! - `items`: row-level reads and writes on the `items` table
//! - `tags`: get-or-create tag resolution and item-tag links
//! - `reindex`: keeps each partition's positions dense
//! - `connection`: opens and bootstraps connections
//!
//! None of these open transactions themselves; `Store` wraps each
//! mutation in one and calls into them.

pub mod connection;
pub mod error;
pub mod items;
pub mod reindex;
pub mod schema;
pub mod tags;

pub use error::{StoreError, StoreResult};
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use tags::TagDiff;
