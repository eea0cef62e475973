//! quotesync CLI
//!
//! Command-line interface for quotesync - a local quote collection with
//! remote sync.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quotesync_core::{Config, SharedStore, StorageError, Store};

mod commands;
mod output;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quotesync")]
#[command(about = "quotesync - Collect, browse and sync short quotes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file (overrides QUOTESYNC_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Show a random quote
    Show {
        /// Switch to this category first ("all" for every category)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List quotes
    #[command(alias = "ls")]
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List categories with quote counts
    Categories,
    /// Add a quote
    Add {
        /// Quote text
        text: String,
        /// Category for the quote
        #[arg(short, long)]
        category: String,
    },
    /// Export quotes as JSON
    Export {
        /// Output file ("-" for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all quotes with the contents of a JSON file
    Import {
        /// JSON file containing an array of quotes
        path: PathBuf,
    },
    /// Sync with the remote server
    Sync {
        /// Push the merged collection back to the server
        #[arg(long)]
        push: bool,
    },
    /// Show status (counts, last quote, sync settings)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, server_url, sync_enabled, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without opening the store
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let store = Store::open_with_config(config.clone())?;

    // Handle TUI (default when no command given)
    let Some(command) = cli.command else {
        return tui::run(store).await;
    };
    if matches!(command, Commands::Tui) {
        return tui::run(store).await;
    }

    init_cli_logging();

    let store = store.into_shared();

    // Read commands pick up remote changes first
    if matches!(
        command,
        Commands::Show { .. } | Commands::List { .. } | Commands::Categories
    ) {
        auto_sync(&store, &config, &output).await;
    }

    let result = match command {
        Commands::Sync { push } => commands::sync::sync(&store, &config, push, &output).await,
        command => {
            let mut store = store.lock().await;
            match command {
                Commands::Show { category } => commands::quote::show(&mut store, category, &output),
                Commands::List { category } => commands::quote::list(&store, category, &output),
                Commands::Categories => commands::category::list(&store, &output),
                Commands::Add { text, category } => {
                    commands::quote::add(&mut store, text, category, &output)
                }
                Commands::Export { output: path } => {
                    commands::transfer::export(&store, path, &output)
                }
                Commands::Import { path } => commands::transfer::import(&mut store, path, &output),
                Commands::Status => commands::status::show(&store, &output),
                Commands::Tui | Commands::Config { .. } | Commands::Sync { .. } => unreachable!(),
            }
        }
    };

    if let Err(ref e) = result {
        print_storage_hint(e);
    }

    result
}

/// Point at a fix when a command failed on the data directory
fn print_storage_hint(error: &anyhow::Error) {
    let hint = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<StorageError>())
        .and_then(StorageError::recovery_suggestion);

    if let Some(hint) = hint {
        eprintln!("hint: {}", hint);
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

/// Log to stderr when QUOTESYNC_LOG is set
fn init_cli_logging() {
    let Ok(log_level) = std::env::var("QUOTESYNC_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "quotesync_core={},quotesync_cli={}",
        log_level, log_level
    ));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Auto-sync if sync is enabled, silently handles errors
async fn auto_sync(store: &SharedStore, config: &Config, output: &Output) {
    if !config.sync_enabled {
        return;
    }

    // Errors shown only in non-quiet mode
    if let Err(e) = commands::sync::sync_quiet(store, config).await {
        if !output.is_quiet() {
            eprintln!("⚠ Auto-sync failed: {:#}", e);
        }
    }
}
