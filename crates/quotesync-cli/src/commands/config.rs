//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use quotesync_core::config::DEFAULT_SERVER_URL;
use quotesync_core::Config;

use crate::output::{Output, OutputFormat};

/// Keys accepted by `config set`
const VALID_KEYS: &str = "data_dir, server_url, sync_enabled, sync_interval_secs, remote_limit, \
                          remote_category, push_after_sync, request_timeout_secs, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("Failed to serialize config")?
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
            println!("  data_dir:             {}", config.data_dir.display());
            println!("  server_url:           {}", config.server_url);
            println!("  sync_enabled:         {}", config.sync_enabled);
            println!("  sync_interval_secs:   {}", config.sync_interval_secs);
            println!("  remote_limit:         {}", config.remote_limit);
            println!("  remote_category:      {}", config.remote_category);
            println!("  push_after_sync:      {}", config.push_after_sync);
            println!("  request_timeout_secs: {}", config.request_timeout_secs);
            println!(
                "  log_file:             {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
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

/// Apply one `key = value` assignment
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "server_url" => {
            config.server_url = if value.is_empty() || value == "default" {
                DEFAULT_SERVER_URL.to_string()
            } else {
                value.to_string()
            };
        }
        "sync_enabled" => {
            config.sync_enabled = value
                .parse()
                .context("Invalid value for sync_enabled. Use 'true' or 'false'.")?;
        }
        "sync_interval_secs" => {
            let secs: u64 = value
                .parse()
                .context("Invalid value for sync_interval_secs. Use a number of seconds.")?;
            if secs == 0 {
                bail!("sync_interval_secs must be greater than zero");
            }
            config.sync_interval_secs = secs;
        }
        "remote_limit" => {
            config.remote_limit = value
                .parse()
                .context("Invalid value for remote_limit. Use a whole number.")?;
        }
        "remote_category" => {
            if value.trim().is_empty() {
                bail!("remote_category cannot be empty");
            }
            config.remote_category = value.trim().to_string();
        }
        "push_after_sync" => {
            config.push_after_sync = value
                .parse()
                .context("Invalid value for push_after_sync. Use 'true' or 'false'.")?;
        }
        "request_timeout_secs" => {
            let secs: u64 = value
                .parse()
                .context("Invalid value for request_timeout_secs. Use a number of seconds.")?;
            if secs == 0 {
                bail!("request_timeout_secs must be greater than zero");
            }
            config.request_timeout_secs = secs;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }

    Ok(())
}
