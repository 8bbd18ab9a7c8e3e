//! Import command handler
//!
//! Reads a JSON array of `{title, url, tags}` entries, the shape an
//! external bookmark-file parser produces, and appends them to the
//! reading list.

use std::path::Path;

use anyhow::{Context, Result};

use shelf_core::{ImportEntry, Store};

use crate::output::Output;

/// Import entries from a JSON file
pub fn run(store: &mut Store, path: &Path, output: &Output) -> Result<()> {
    let entries = read_entries(path)?;
    let summary = store
        .import_bookmarks(&entries)
        .context("Failed to import bookmarks")?;

    output.print_import(&summary, entries.len());
    Ok(())
}

fn read_entries(path: &Path) -> Result<Vec<ImportEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file (expected a JSON array of {{title, url, tags}}): {:?}", path))
}
