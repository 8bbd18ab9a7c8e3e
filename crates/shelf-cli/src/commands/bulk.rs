//! Bulk command handlers
//!
//! Each handler resolves every id up front, so an unknown prefix aborts
//! before anything is written.

use anyhow::{bail, Context, Result};

use shelf_core::{ItemType, Store};

use super::{parse_item_ids, split_tags};
use crate::output::Output;
use crate::prompt::confirm;

/// Delete several items
pub fn delete(store: &mut Store, ids: Vec<String>, output: &Output) -> Result<()> {
    let uuids = parse_item_ids(&ids, store)?;

    if output.should_prompt() && !confirm(&format!("Delete {} item(s)?", uuids.len()))? {
        println!("Cancelled.");
        return Ok(());
    }

    let deleted = store
        .bulk_delete(&uuids)
        .context("Failed to delete items")?;
    output.success(&format!("Deleted {} item(s)", deleted));
    Ok(())
}

/// Move several items to the head of a list, in the order given
pub fn move_to(
    store: &mut Store,
    ids: Vec<String>,
    item_type: ItemType,
    output: &Output,
) -> Result<()> {
    let uuids = parse_item_ids(&ids, store)?;
    let moved = store
        .bulk_move(&uuids, item_type)
        .context("Failed to move items")?;
    output.success(&format!("Moved {} item(s) to {}", moved, item_type));
    Ok(())
}

/// Add tags to several items
pub fn tag(store: &mut Store, ids: Vec<String>, tags: Vec<String>, output: &Output) -> Result<()> {
    let tags = split_tags(&tags);
    if tags.is_empty() {
        bail!("No tags given. Use --tag NAME (repeatable or comma-separated).");
    }

    let uuids = parse_item_ids(&ids, store)?;
    let linked = store
        .bulk_tag(&uuids, &tags)
        .context("Failed to tag items")?;
    output.success(&format!(
        "Added {} new tag link(s) across {} item(s)",
        linked,
        uuids.len()
    ));
    Ok(())
}

/// Mark several items read or unread
pub fn set_read(store: &mut Store, ids: Vec<String>, read: bool, output: &Output) -> Result<()> {
    let uuids = parse_item_ids(&ids, store)?;
    let updated = store
        .bulk_mark_read(&uuids, read)
        .context("Failed to update read state")?;

    let state = if read { "read" } else { "unread" };
    output.success(&format!("Marked {} item(s) as {}", updated, state));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use shelf_core::NewItem;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_bulk_move_by_prefix() {
        let mut store = Store::open_in_memory().unwrap();
        let a = store
            .create_item(NewItem::new("A", "https://a.com").with_type(ItemType::ReadingList))
            .unwrap();
        let b = store
            .create_item(NewItem::new("B", "https://b.com").with_type(ItemType::ReadingList))
            .unwrap();

        move_to(
            &mut store,
            vec![a.to_string(), b.to_string()[..8].to_string()],
            ItemType::Bookmark,
            &quiet(),
        )
        .unwrap();

        let ids: Vec<_> = store
            .list_partition(ItemType::Bookmark)
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_bulk_unknown_prefix_writes_nothing() {
        let mut store = Store::open_in_memory().unwrap();
        let a = store.create_item(NewItem::new("A", "https://a.com")).unwrap();

        let result = set_read(&mut store, vec![a.to_string(), "zzzz".to_string()], true, &quiet());
        assert!(result.is_err());
        assert!(!store.get_item(a).unwrap().unwrap().read);
    }

    #[test]
    fn test_bulk_tag_requires_tags() {
        let mut store = Store::open_in_memory().unwrap();
        let a = store.create_item(NewItem::new("A", "https://a.com")).unwrap();

        assert!(tag(&mut store, vec![a.to_string()], vec![" ".to_string()], &quiet()).is_err());
        tag(&mut store, vec![a.to_string()], vec!["x,y".to_string()], &quiet()).unwrap();
        assert_eq!(store.get_item(a).unwrap().unwrap().tag_names(), vec!["x", "y"]);
    }
}
