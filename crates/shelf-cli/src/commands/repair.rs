//! Repair command handler

use anyhow::{Context, Result};

use shelf_core::Store;

use crate::output::{Output, OutputFormat};

/// Renumber every list, newest first
pub fn run(store: &mut Store, output: &Output) -> Result<()> {
    let written = store
        .repair_positions()
        .context("Failed to repair positions")?;

    match output.format {
        OutputFormat::Json => {
            let lists: serde_json::Map<String, serde_json::Value> = written
                .iter()
                .map(|(t, rows)| (t.to_string(), serde_json::json!(rows)))
                .collect();
            println!("{}", serde_json::json!({ "rewritten": lists }));
        }
        OutputFormat::Quiet => {}
        OutputFormat::Human => {
            for (item_type, rows) in &written {
                println!("{}: {} position(s) rewritten", item_type, rows);
            }
            output.success("Positions repaired");
        }
    }
    Ok(())
}
