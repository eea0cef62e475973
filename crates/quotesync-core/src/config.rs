//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/quotesync/config.toml)
//! 3. Environment variables (QUOTESYNC_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "QUOTESYNC";

/// Placeholder endpoint used when no server is configured
pub const DEFAULT_SERVER_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for persisted quotes and selection state
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote endpoint read (GET) and written (POST) during reconciliation
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Whether the background reconciliation runs
    #[serde(default = "default_true")]
    pub sync_enabled: bool,

    /// Seconds between periodic reconciliation runs
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    /// Maximum number of remote records taken per fetch
    #[serde(default = "default_remote_limit")]
    pub remote_limit: usize,

    /// Category assigned to every quote mapped from the remote endpoint
    #[serde(default = "default_remote_category")]
    pub remote_category: String,

    /// Push the merged collection back to the server after each run
    #[serde(default)]
    pub push_after_sync: bool,

    /// Timeout applied to each remote request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log file used by the TUI (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            server_url: default_server_url(),
            sync_enabled: true,
            sync_interval_secs: default_sync_interval(),
            remote_limit: default_remote_limit(),
            remote_category: default_remote_category(),
            push_after_sync: false,
            request_timeout_secs: default_request_timeout(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (QUOTESYNC_DATA_DIR, QUOTESYNC_SERVER_URL, ...)
    /// 2. Config file (~/.config/quotesync/config.toml or QUOTESYNC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // QUOTESYNC_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // QUOTESYNC_SERVER_URL (empty string restores the default endpoint)
        if let Ok(val) = std::env::var(format!("{}_SERVER_URL", ENV_PREFIX)) {
            self.server_url = if val.is_empty() {
                default_server_url()
            } else {
                val
            };
        }

        // QUOTESYNC_SYNC_ENABLED
        if let Ok(val) = std::env::var(format!("{}_SYNC_ENABLED", ENV_PREFIX)) {
            self.sync_enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        // QUOTESYNC_SYNC_INTERVAL
        if let Ok(val) = std::env::var(format!("{}_SYNC_INTERVAL", ENV_PREFIX)) {
            if let Ok(secs) = val.parse::<u64>() {
                if secs > 0 {
                    self.sync_interval_secs = secs;
                }
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with QUOTESYNC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quotesync")
            .join("config.toml")
    }

    /// Path of the persisted quote collection
    pub fn quotes_path(&self) -> PathBuf {
        self.data_dir.join("quotes.json")
    }

    /// Path of the last shown quote snapshot
    pub fn last_quote_path(&self) -> PathBuf {
        self.data_dir.join("last_quote.json")
    }

    /// Path of the last selected category
    pub fn selected_category_path(&self) -> PathBuf {
        self.data_dir.join("selected_category")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotesync")
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_sync_interval() -> u64 {
    30
}

fn default_remote_limit() -> usize {
    5
}

fn default_remote_category() -> String {
    "Server".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "QUOTESYNC_DATA_DIR",
        "QUOTESYNC_SERVER_URL",
        "QUOTESYNC_SYNC_ENABLED",
        "QUOTESYNC_SYNC_INTERVAL",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.sync_enabled);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.sync_interval_secs, 30);
        assert_eq!(config.remote_limit, 5);
        assert_eq!(config.remote_category, "Server");
        assert!(!config.push_after_sync);
        assert!(config.data_dir.ends_with("quotesync"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();

        assert!(config.quotes_path().ends_with("quotes.json"));
        assert!(config.last_quote_path().ends_with("last_quote.json"));
        assert!(config
            .selected_category_path()
            .ends_with("selected_category"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("QUOTESYNC_DATA_DIR", "/tmp/quotesync-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/quotesync-test"));
    }

    #[test]
    fn test_env_override_sync_enabled() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("QUOTESYNC_SYNC_ENABLED", "false");
        config.apply_env_overrides();
        assert!(!config.sync_enabled);

        env::set_var("QUOTESYNC_SYNC_ENABLED", "1");
        config.apply_env_overrides();
        assert!(config.sync_enabled);

        env::set_var("QUOTESYNC_SYNC_ENABLED", "TRUE");
        config.sync_enabled = false;
        config.apply_env_overrides();
        assert!(config.sync_enabled);
    }

    #[test]
    fn test_env_override_server_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("QUOTESYNC_SERVER_URL", "http://localhost:8080/quotes");
        config.apply_env_overrides();
        assert_eq!(config.server_url, "http://localhost:8080/quotes");

        // Empty string restores the default
        env::set_var("QUOTESYNC_SERVER_URL", "");
        config.apply_env_overrides();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_env_override_sync_interval() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("QUOTESYNC_SYNC_INTERVAL", "120");
        config.apply_env_overrides();
        assert_eq!(config.sync_interval_secs, 120);

        // Garbage and zero are ignored
        env::set_var("QUOTESYNC_SYNC_INTERVAL", "soon");
        config.apply_env_overrides();
        assert_eq!(config.sync_interval_secs, 120);

        env::set_var("QUOTESYNC_SYNC_INTERVAL", "0");
        config.apply_env_overrides();
        assert_eq!(config.sync_interval_secs, 120);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/quotesync"),
            server_url: "http://example.com/posts".to_string(),
            sync_enabled: false,
            sync_interval_secs: 60,
            remote_limit: 3,
            remote_category: "Remote".to_string(),
            push_after_sync: true,
            request_timeout_secs: 5,
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("server_url"));
        assert!(toml_str.contains("sync_interval_secs"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.server_url, config.server_url);
        assert_eq!(parsed.sync_enabled, config.sync_enabled);
        assert_eq!(parsed.remote_limit, 3);
        assert!(parsed.push_after_sync);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("custom");

        std::fs::write(
            &path,
            format!(
                "data_dir = {:?}\nremote_category = \"Remote\"\n",
                data_dir.display().to_string()
            ),
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.data_dir, data_dir);
        assert_eq!(config.remote_category, "Remote");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.sync_interval_secs, 30);
        assert!(config.sync_enabled);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            remote_limit: 2,
            ..Config::default()
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.remote_limit, 2);
        assert!(loaded.data_dir.exists());
    }
}
