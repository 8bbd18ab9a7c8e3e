//! Status command handler

use anyhow::Result;

use shelf_core::{ItemType, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let config = store.config();
    let bookmarks = store.count_items(Some(ItemType::Bookmark))?;
    let reading = store.list_partition(ItemType::ReadingList)?;
    let unread = reading.iter().filter(|i| !i.read).count();
    let tags = store.tags_with_counts()?.len();
    let broken = store.check_density()?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "database": config.sqlite_path(),
                    "counts": {
                        "bookmarks": bookmarks,
                        "reading_list": reading.len(),
                        "unread": unread,
                        "tags": tags
                    },
                    "positions_ok": broken.is_empty(),
                    "needs_repair": broken
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", if broken.is_empty() { "ok" } else { "needs-repair" });
        }
        OutputFormat::Human => {
            println!("Shelf Status");
            println!("============");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Database: {}", config.sqlite_path().display());
            println!();
            println!("Contents:");
            println!("  Bookmarks:    {}", bookmarks);
            println!("  Reading list: {} ({} unread)", reading.len(), unread);
            println!("  Tags:         {}", tags);
            println!();
            if broken.is_empty() {
                println!("Positions: ok");
            } else {
                let names: Vec<&str> = broken.iter().map(|t| t.as_str()).collect();
                println!("Positions: gaps or duplicates in {}", names.join(", "));
                println!("  Run `shelf repair` to renumber.");
            }
        }
    }

    Ok(())
}
