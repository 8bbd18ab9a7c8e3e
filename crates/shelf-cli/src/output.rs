//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use shelf_core::{ImportSummary, Item, ItemType};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single item with all fields
    pub fn print_item(&self, item: &Item) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", item.id);
                println!("Title:    {}", item.title);
                println!("URL:      {}", item.url);
                println!("List:     {} (#{})", item.item_type, item.position);
                if item.item_type == ItemType::ReadingList {
                    println!("Read:     {}", if item.read { "yes" } else { "no" });
                }
                if item.starred {
                    println!("Starred:  yes");
                }
                if let Some(ref favicon) = item.favicon_url {
                    println!("Favicon:  {}", favicon);
                }
                if !item.tags.is_empty() {
                    println!("Tags:     {}", item.tag_names().join(", "));
                }
                println!("Created:  {}", item.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:  {}", item.updated_at.format("%Y-%m-%d %H:%M"));

                if let Some(ref notes) = item.notes {
                    println!();
                    println!("── Notes ──");
                    println!("{}", notes);
                }
            }
            OutputFormat::Json => print_json(item),
            OutputFormat::Quiet => {
                println!("{}", item.id);
            }
        }
    }

    /// Print a list of items, one line each, grouped by list
    pub fn print_items(&self, items: &[Item]) {
        match self.format {
            OutputFormat::Human => {
                if items.is_empty() {
                    println!("No items found.");
                    return;
                }
                let mut current: Option<ItemType> = None;
                for item in items {
                    if current != Some(item.item_type) {
                        if current.is_some() {
                            println!();
                        }
                        println!("── {} ──", item.item_type);
                        current = Some(item.item_type);
                    }
                    println!("{}", item_line(item));
                }
                println!("\n{} item(s)", items.len());
            }
            OutputFormat::Json => print_json(&items),
            OutputFormat::Quiet => {
                for item in items {
                    println!("{}", item.id);
                }
            }
        }
    }

    /// Print a list of tags
    pub fn print_tags(&self, tags: &[(String, i64)]) {
        match self.format {
            OutputFormat::Human => {
                if tags.is_empty() {
                    println!("No tags found.");
                    return;
                }
                for (name, count) in tags {
                    println!("{} ({})", name, count);
                }
                println!("\n{} tag(s)", tags.len());
            }
            OutputFormat::Json => {
                let json_tags: Vec<_> = tags
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                print_json(&json_tags);
            }
            OutputFormat::Quiet => {
                for (name, _) in tags {
                    println!("{}", name);
                }
            }
        }
    }

    /// Print the outcome of an import
    pub fn print_import(&self, summary: &ImportSummary, received: usize) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Imported {} of {} entries into the reading list",
                    summary.imported, received
                );
                let skipped = received.saturating_sub(summary.imported);
                if skipped > 0 {
                    println!("  {} skipped (duplicate or missing url)", skipped);
                }
            }
            OutputFormat::Json => print_json(summary),
            OutputFormat::Quiet => println!("{}", summary.imported),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: failed to encode JSON output: {}", e),
    }
}

/// One-line summary used by list output
fn item_line(item: &Item) -> String {
    let marker = match (item.item_type, item.read) {
        (ItemType::ReadingList, true) => "✓",
        (ItemType::ReadingList, false) => "·",
        _ if item.starred => "★",
        _ => " ",
    };
    let tags = if item.tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", item.tag_names().join(", "))
    };
    format!(
        "{:>3} {} {} | {}{} | {}",
        item.position,
        marker,
        short_id(item),
        truncate(&item.title, 35),
        tags,
        truncate(&item.url, 45)
    )
}

/// First eight characters of an item's id
pub fn short_id(item: &Item) -> String {
    item.id.to_string()[..8].to_string()
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(item_type: ItemType, read: bool, starred: bool) -> Item {
        let now = Utc::now();
        Item {
            id: Uuid::parse_str("0123abcd-0000-4000-8000-000000000000").unwrap(),
            title: "Example".to_string(),
            url: "https://example.com".to_string(),
            favicon_url: None,
            item_type,
            starred,
            notes: None,
            read,
            position: 4,
            tags: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multi-byte characters are never split
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_item_line_markers() {
        let line = item_line(&item(ItemType::ReadingList, true, false));
        assert!(line.starts_with("  4 ✓ 0123abcd"));

        let line = item_line(&item(ItemType::ReadingList, false, true));
        assert!(line.contains("·"));

        let line = item_line(&item(ItemType::Bookmark, false, true));
        assert!(line.contains("★"));
    }

    #[test]
    fn test_should_prompt_only_for_humans() {
        assert!(Output::new(OutputFormat::Human).should_prompt());
        assert!(!Output::new(OutputFormat::Json).should_prompt());
        assert!(!Output::new(OutputFormat::Quiet).should_prompt());
    }
}
