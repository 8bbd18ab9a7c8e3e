//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use shelf_core::{Config, ItemType};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "log_file": config.log_file,
                    "fetch_timeout_secs": config.fetch_timeout_secs,
                    "default_type": config.default_type
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:           {}", config.data_dir.display());
            println!(
                "  log_file:           {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  fetch_timeout_secs: {}", config.fetch_timeout_secs);
            println!("  default_type:       {}", config.default_type);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        "fetch_timeout_secs" => {
            config.fetch_timeout_secs = value
                .parse()
                .context("Invalid value for fetch_timeout_secs. Use a whole number of seconds.")?;
        }
        "default_type" => {
            config.default_type = value
                .parse::<ItemType>()
                .context("Invalid value for default_type. Use 'bookmark' or 'reading-list'.")?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, log_file, fetch_timeout_secs, default_type",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "default_type", "reading-list").unwrap();
        assert_eq!(config.default_type, ItemType::ReadingList);

        apply(&mut config, "fetch_timeout_secs", "9").unwrap();
        assert_eq!(config.fetch_timeout_secs, 9);

        apply(&mut config, "log_file", "/tmp/shelf.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/shelf.log")));
        apply(&mut config, "log_file", "none").unwrap();
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply(&mut config, "sync_url", "x").is_err());
        assert!(apply(&mut config, "fetch_timeout_secs", "soon").is_err());
        assert!(apply(&mut config, "default_type", "archive").is_err());
    }

    #[test]
    fn test_set_writes_to_cli_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set(
            "data_dir".to_string(),
            "/srv/shelf".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("/srv/shelf"));
    }
}
