//! Command handlers

pub mod bulk;
pub mod config;
pub mod import;
pub mod item;
pub mod repair;
pub mod status;
pub mod tag;

use anyhow::{bail, Result};
use uuid::Uuid;

use shelf_core::{ItemType, Store};

/// Parse an item ID (supports full UUID or prefix)
pub fn parse_item_id(id: &str, store: &Store) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    let items = store.list_items()?;
    let matches: Vec<_> = items
        .iter()
        .filter(|item| item.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No item found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple items match '{}':", id);
            for item in &matches {
                eprintln!("  {} - {}", item.id, item.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Parse several item IDs, keeping caller order
pub fn parse_item_ids(ids: &[String], store: &Store) -> Result<Vec<Uuid>> {
    ids.iter().map(|id| parse_item_id(id, store)).collect()
}

/// clap value parser for list types
pub fn parse_item_type(s: &str) -> Result<ItemType, String> {
    s.parse().map_err(|e: shelf_core::StoreError| e.to_string())
}

/// Split a comma-separated tag argument list
pub fn split_tags(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|s| s.split(','))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_core::NewItem;

    #[test]
    fn test_parse_item_id_full_and_prefix() {
        let mut store = Store::open_in_memory().unwrap();
        let id = store
            .create_item(NewItem::new("A", "https://a.com"))
            .unwrap();

        assert_eq!(parse_item_id(&id.to_string(), &store).unwrap(), id);
        assert_eq!(parse_item_id(&id.to_string()[..6], &store).unwrap(), id);
        assert!(parse_item_id("zzzz", &store).is_err());
    }

    #[test]
    fn test_parse_item_id_ambiguous() {
        let mut store = Store::open_in_memory().unwrap();
        for n in 0..2 {
            store
                .create_item(NewItem::new("A", format!("https://{}.com", n)))
                .unwrap();
        }
        // The empty prefix matches everything
        assert!(parse_item_id("", &store).is_err());
    }

    #[test]
    fn test_parse_item_type() {
        assert_eq!(parse_item_type("reading-list"), Ok(ItemType::ReadingList));
        assert!(parse_item_type("inbox").is_err());
    }

    #[test]
    fn test_split_tags() {
        let raw = vec!["rust, web".to_string(), "".to_string(), "cli".to_string()];
        assert_eq!(split_tags(&raw), vec!["rust", "web", "cli"]);
    }
}
