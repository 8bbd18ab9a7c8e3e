//! Shelf CLI
//!
//! Command-line interface for shelf - ordered bookmarks and a reading list.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shelf_core::{Config, ItemType, Store, StoreError};

mod commands;
mod metadata;
mod output;
mod prompt;

use commands::item::{AddArgs, EditArgs};
use commands::parse_item_type;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - ordered bookmarks and reading list")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a URL at the top of a list
    #[command(alias = "create")]
    Add(AddArgs),
    /// List items
    #[command(alias = "ls")]
    List {
        /// Only this list (bookmark or reading-list)
        #[arg(long = "type", value_parser = parse_item_type)]
        item_type: Option<ItemType>,
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Show item details
    Show {
        /// Item ID (full UUID or prefix)
        id: String,
    },
    /// Check whether a URL is already saved
    Lookup {
        /// Exact URL
        url: String,
    },
    /// Edit an item
    Edit {
        /// Item ID (full UUID or prefix)
        id: String,
        #[command(flatten)]
        args: EditArgs,
    },
    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        /// Item ID (full UUID or prefix)
        id: String,
    },
    /// Move an item to a position in its list
    #[command(alias = "mv")]
    Move {
        /// Item ID (full UUID or prefix)
        id: String,
        /// Target position (0 is the top; past the end appends)
        #[arg(allow_negative_numbers = true)]
        position: i64,
        /// List the item is in (defaults to its current list)
        #[arg(long = "type", value_parser = parse_item_type)]
        item_type: Option<ItemType>,
    },
    /// Mark an item as read
    Read {
        /// Item ID (full UUID or prefix)
        id: String,
    },
    /// Mark an item as unread
    Unread {
        /// Item ID (full UUID or prefix)
        id: String,
    },
    /// Add a tag to an item
    Tag {
        /// Item ID (full UUID or prefix)
        id: String,
        /// Tag name
        name: String,
    },
    /// Remove a tag from an item
    Untag {
        /// Item ID (full UUID or prefix)
        id: String,
        /// Tag name
        name: String,
    },
    /// Operate on several items at once
    Bulk {
        #[command(subcommand)]
        command: BulkCommands,
    },
    /// Import a JSON array of {title, url, tags} into the reading list
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// List all tags
    Tags,
    /// Show status (storage location, counts, position health)
    Status,
    /// Renumber every list, newest first
    Repair,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum BulkCommands {
    /// Delete items
    #[command(alias = "rm")]
    Delete {
        /// Item IDs (full UUID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Move items to the top of a list, in the order given
    #[command(alias = "mv")]
    Move {
        /// Destination list
        #[arg(long = "type", value_parser = parse_item_type)]
        item_type: ItemType,
        /// Item IDs (full UUID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Add tags to items
    Tag {
        /// Tags to add (repeatable or comma-separated)
        #[arg(short, long, required = true)]
        tag: Vec<String>,
        /// Item IDs (full UUID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark items as read
    Read {
        /// Item IDs (full UUID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark items as unread
    Unread {
        /// Item IDs (full UUID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, fetch_timeout_secs, default_type)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    let result = run(cli, &output).await;

    if let Err(ref e) = result {
        if let Some(hint) = e
            .downcast_ref::<StoreError>()
            .and_then(StoreError::recovery_suggestion)
        {
            eprintln!("Hint: {}", hint);
        }
    }

    result
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    config.ensure_data_dir()?;
    init_logging(&config);

    let mut store = Store::open_with_config(config).context("Failed to open database")?;

    match cli.command {
        Commands::Add(args) => commands::item::add(&mut store, args, output).await,
        Commands::List { item_type, tag } => commands::item::list(&store, item_type, tag, output),
        Commands::Show { id } => commands::item::show(&store, id, output),
        Commands::Lookup { url } => commands::item::lookup(&store, url, output),
        Commands::Edit { id, args } => commands::item::edit(&mut store, id, args, output),
        Commands::Delete { id } => commands::item::delete(&mut store, id, output),
        Commands::Move {
            id,
            position,
            item_type,
        } => commands::item::reorder(&mut store, id, item_type, position, output),
        Commands::Read { id } => commands::item::set_read(&mut store, id, true, output),
        Commands::Unread { id } => commands::item::set_read(&mut store, id, false, output),
        Commands::Tag { id, name } => commands::tag::add(&mut store, id, name, output),
        Commands::Untag { id, name } => commands::tag::remove(&mut store, id, name, output),
        Commands::Bulk { command } => handle_bulk_command(command, &mut store, output),
        Commands::Import { file } => commands::import::run(&mut store, &file, output),
        Commands::Tags => commands::tag::list(&store, output),
        Commands::Status => commands::status::show(&store, output),
        Commands::Repair => commands::repair::run(&mut store, output),
        Commands::Config { .. } => Ok(()), // Handled above
    }
}

fn handle_bulk_command(command: BulkCommands, store: &mut Store, output: &Output) -> Result<()> {
    match command {
        BulkCommands::Delete { ids } => commands::bulk::delete(store, ids, output),
        BulkCommands::Move { item_type, ids } => {
            commands::bulk::move_to(store, ids, item_type, output)
        }
        BulkCommands::Tag { tag, ids } => commands::bulk::tag(store, ids, tag, output),
        BulkCommands::Read { ids } => commands::bulk::set_read(store, ids, true, output),
        BulkCommands::Unread { ids } => commands::bulk::set_read(store, ids, false, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize file logging when SHELF_LOG is set
///
/// SHELF_LOG holds the level (e.g. `debug`); output goes to the configured
/// log file so it never mixes with command output.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("SHELF_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "shelf_core={},shelf_cli={}",
        log_level, log_level
    ));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("logging initialized to {:?}", log_path);
}
