//! Tag command handlers

use anyhow::Result;

use shelf_core::Store;

use super::parse_item_id;
use crate::output::Output;

/// List all tags with usage counts
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let tags = store.tags_with_counts()?;
    output.print_tags(&tags);
    Ok(())
}

/// Attach a tag to one item
pub fn add(store: &mut Store, id: String, name: String, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, store)?;
    if store.tag_item(uuid, &name)? {
        output.success(&format!("Tagged {} with '{}'", uuid, name.trim().to_lowercase()));
    } else {
        output.message(&format!("Already tagged with '{}'", name.trim().to_lowercase()));
    }
    Ok(())
}

/// Detach a tag from one item; the tag itself is kept
pub fn remove(store: &mut Store, id: String, name: String, output: &Output) -> Result<()> {
    let uuid = parse_item_id(&id, store)?;
    if store.untag_item(uuid, &name)? {
        output.success(&format!("Removed '{}' from {}", name.trim().to_lowercase(), uuid));
    } else {
        output.message(&format!("Not tagged with '{}'", name.trim().to_lowercase()));
    }
    Ok(())
}
