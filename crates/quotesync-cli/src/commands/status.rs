//! Status command handler

use anyhow::Result;

use quotesync_core::Store;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.storage_stats();
    let config = store.config();
    let last_quote = store.last_quote()?;
    let categories = store.category_counts();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "sync_enabled": config.sync_enabled,
                    "server_url": config.server_url,
                    "sync_interval_secs": config.sync_interval_secs,
                    "selected_category": store.filter().label(),
                    "last_quote": last_quote,
                    "storage": {
                        "quotes_saved": stats.quotes_exists,
                        "total_size": stats.total_size()
                    },
                    "counts": {
                        "quotes": store.len(),
                        "categories": categories.len()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", store.len());
        }
        OutputFormat::Human => {
            println!("quotesync Status");
            println!("================");
            println!();
            println!("Quotes:");
            println!("  Count:      {}", store.len());
            println!("  Categories: {}", categories.len());
            println!("  Selected:   {}", store.filter());
            match last_quote {
                Some(ref quote) => println!("  Last shown: {}", quote),
                None => println!("  Last shown: (none)"),
            }
            println!();
            println!("Sync:");
            println!(
                "  Status:   {}",
                if config.sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!("  Server:   {}", config.server_url);
            println!("  Interval: {}s", config.sync_interval_secs);
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            if stats.quotes_exists {
                println!("  Size:     {}", stats.total_size_human());
            } else {
                println!("  Size:     (defaults, nothing saved yet)");
            }
        }
    }

    Ok(())
}
