//! Item command handlers

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use shelf_core::{ItemType, ItemUpdate, NewItem, Store};

use super::{parse_item_id, parse_item_type, split_tags};
use crate::metadata::fetch_page_title;
use crate::output::{print_json, short_id, Output, OutputFormat};
use crate::prompt::{confirm, prompt_with_default};

/// Options for `shelf add`
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// URL to save
    pub url: String,
    /// Title (fetched from the page if omitted)
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Tags to add (repeatable or comma-separated)
    #[arg(short, long)]
    pub tag: Vec<String>,
    /// List to add to (bookmark or reading-list)
    #[arg(long = "type", value_parser = parse_item_type)]
    pub item_type: Option<ItemType>,
    /// Notes
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Favicon URL
    #[arg(long)]
    pub favicon: Option<String>,
}

/// Options for `shelf edit`; with none given, edits interactively
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// New title
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// New URL
    #[arg(long)]
    pub url: Option<String>,
    /// New favicon URL (empty string clears it)
    #[arg(long)]
    pub favicon: Option<String>,
    /// Move to another list
    #[arg(long = "type", value_parser = parse_item_type)]
    pub item_type: Option<ItemType>,
    /// Star the item
    #[arg(long, conflicts_with = "unstar")]
    pub star: bool,
    /// Unstar the item
    #[arg(long)]
    pub unstar: bool,
    /// New notes (empty string clears them)
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Mark as read
    #[arg(long, conflicts_with = "unread")]
    pub read: bool,
    /// Mark as unread
    #[arg(long)]
    pub unread: bool,
    /// Replace tags (comma-separated; empty string clears them)
    #[arg(long)]
    pub tags: Option<String>,
}

impl EditArgs {
    /// Convert flags into a partial update
    pub fn into_update(self) -> ItemUpdate {
        ItemUpdate {
            title: self.title,
            url: self.url,
            favicon_url: self.favicon.map(empty_to_none),
            item_type: self.item_type,
            starred: flag_pair(self.star, self.unstar),
            notes: self.notes.map(empty_to_none),
            read: flag_pair(self.read, self.unread),
            tag_names: self.tags.map(|t| split_tags(&[t])),
        }
    }
}

fn empty_to_none(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Create a new item at the head of its list
pub async fn add(store: &mut Store, args: AddArgs, output: &Output) -> Result<()> {
    let item_type = args.item_type.unwrap_or(store.config().default_type);

    let title = match args.title {
        Some(title) => title,
        None => {
            let timeout = Duration::from_secs(store.config().fetch_timeout_secs);
            fetch_page_title(&args.url, timeout)
                .await
                .unwrap_or_else(|| args.url.clone())
        }
    };

    let mut new = NewItem::new(title, args.url)
        .with_type(item_type)
        .with_tags(split_tags(&args.tag));
    new.notes = args.notes;
    new.favicon_url = args.favicon;

    let id = store.create_item(new).context("Failed to create item")?;
    let item = store
        .get_item(id)?
        .ok_or_else(|| anyhow!("Item vanished after create: {}", id))?;

    output.success(&format!("Added to {}: {}", item_type, id));
    output.print_item(&item);
    Ok(())
}

/// List items, optionally restricted to one list and/or tag
pub fn list(
    store: &Store,
    item_type: Option<ItemType>,
    tag: Option<String>,
    output: &Output,
) -> Result<()> {
    let items = match (item_type, tag) {
        (_, Some(ref tag)) => store
            .list_items_by_tag(tag)?
            .into_iter()
            .filter(|item| item_type.map_or(true, |t| item.item_type == t))
            .collect(),
        (Some(t), None) => store.list_partition(t)?,
        (None, None) => store.list_items()?,
    };

    output.print_items(&items);
    Ok(())
}

/// Show a single item
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, store)?;

    let item = store
        .get_item(uuid)?
        .ok_or_else(|| anyhow!("Item not found: {}", id))?;

    output.print_item(&item);
    Ok(())
}

/// Look up a saved item by exact URL
pub fn lookup(store: &Store, url: String, output: &Output) -> Result<()> {
    let found = store.lookup_by_url(&url)?;

    match (found, output.format) {
        (Some(item), _) => output.print_item(&item),
        (None, OutputFormat::Json) => {
            print_json(&serde_json::json!({"found": false, "url": url}));
        }
        (None, _) => output.message(&format!("Not saved: {}", url)),
    }
    Ok(())
}

/// Edit an item from flags, or interactively when no flag is given
pub fn edit(store: &mut Store, id: String, args: EditArgs, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, store)?;

    let mut update = args.into_update();
    if update.is_empty() {
        update = prompt_update(store, uuid)?;
        if update.is_empty() {
            output.message("No changes.");
            return Ok(());
        }
    }

    store
        .update_item(uuid, update)
        .context("Failed to update item")?;

    let item = store
        .get_item(uuid)?
        .ok_or_else(|| anyhow!("Item not found: {}", id))?;
    output.success("Item updated");
    output.print_item(&item);
    Ok(())
}

/// Build an update by prompting for each editable field
fn prompt_update(store: &Store, id: uuid::Uuid) -> Result<ItemUpdate> {
    let item = store
        .get_item(id)?
        .ok_or_else(|| anyhow!("Item not found: {}", id))?;

    println!("Editing item: {}", item.id);
    println!("Press Enter to keep current value, or type new value.\n");

    let mut update = ItemUpdate {
        title: prompt_with_default("Title", &item.title)?,
        url: prompt_with_default("URL", &item.url)?,
        ..Default::default()
    };

    if let Some(notes) = prompt_with_default("Notes", item.notes.as_deref().unwrap_or(""))? {
        update.notes = Some(empty_to_none(notes));
    }

    let current_tags = item.tag_names().join(", ");
    if let Some(tags) = prompt_with_default("Tags (comma-separated)", &current_tags)? {
        update.tag_names = Some(split_tags(&[tags]));
    }

    Ok(update)
}

/// Delete an item
pub fn delete(store: &mut Store, id: String, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, store)?;

    let item = store
        .get_item(uuid)?
        .ok_or_else(|| anyhow!("Item not found: {}", id))?;

    if output.should_prompt() {
        println!("Delete {}: {} - {}", item.item_type, short_id(&item), item.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete_item(uuid).context("Failed to delete item")?;

    output.success(&format!("Deleted item: {}", uuid));
    Ok(())
}

/// Move an item to a position within a list
///
/// Without `--type` the item's current list is used.
pub fn reorder(
    store: &mut Store,
    id: String,
    item_type: Option<ItemType>,
    position: i64,
    output: &Output,
) -> Result<()> {
    let uuid = parse_item_id(&id, store)?;
    let item_type = match item_type {
        Some(t) => t,
        None => {
            store
                .get_item(uuid)?
                .ok_or_else(|| anyhow!("Item not found: {}", id))?
                .item_type
        }
    };

    if store.reorder_item(uuid, item_type, position)? {
        output.success(&format!("Moved {} to position {} in {}", uuid, position.max(0), item_type));
    } else {
        output.message(&format!("Item {} is not in {}; nothing moved", uuid, item_type));
    }
    Ok(())
}

/// Mark one item read or unread
pub fn set_read(store: &mut Store, id: String, read: bool, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, store)?;
    store.toggle_read(uuid, read)?;

    let state = if read { "read" } else { "unread" };
    output.success(&format!("Marked {} as {}", uuid, state));
    Ok(())
}
