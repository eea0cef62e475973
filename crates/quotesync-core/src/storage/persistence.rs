//! JSON file persistence
//!
//! Handles saving and loading the quote collection and the selection state
//! to/from the filesystem. Uses atomic writes (write to temp file, then
//! rename) to prevent corruption.
//!
//! Storage location: `~/.local/share/quotesync/` (configurable via `Config`)
//!
//! Files:
//! - `quotes.json` - The quote collection as a JSON array
//! - `last_quote.json` - The last quote shown
//! - `selected_category` - The last selected category, plain text

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::config::Config;
use crate::models::Quote;

/// Sizes of the persisted files
#[derive(Debug, Clone, Default)]
pub struct StorageStats {
    pub quotes_exists: bool,
    pub quotes_size: u64,
    pub last_quote_size: u64,
}

impl StorageStats {
    pub fn total_size(&self) -> u64 {
        self.quotes_size + self.last_quote_size
    }

    /// Human-readable total size
    pub fn total_size_human(&self) -> String {
        let size = self.total_size();
        if size < 1024 {
            format!("{} B", size)
        } else if size < 1024 * 1024 {
            format!("{:.1} KB", size as f64 / 1024.0)
        } else {
            format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
        }
    }
}

/// Persistence layer for the quote collection
pub struct JsonPersistence {
    config: Config,
}

impl JsonPersistence {
    /// Create a new persistence handler with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Save the full collection using atomic write
    pub fn save_quotes(&self, quotes: &[Quote]) -> StorageResult<()> {
        let path = self.config.quotes_path();
        let json = serde_json::to_vec(quotes).map_err(|source| StorageError::Encode {
            path: path.clone(),
            source,
        })?;
        atomic_write(&path, &json)?;
        debug!("Saved {} quotes to {:?}", quotes.len(), path);
        Ok(())
    }

    /// Load the collection
    ///
    /// Returns `None` when nothing usable is stored: the file is missing,
    /// not JSON (including bytes that are not UTF-8), not an array, or holds
    /// a non-object element. Content problems are logged and otherwise
    /// ignored; only I/O failures are reported as errors.
    pub fn load_quotes(&self) -> StorageResult<Option<Vec<Quote>>> {
        let path = self.config.quotes_path();
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };

        let value: Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring unreadable quote file {:?}: {}", path, e);
                return Ok(None);
            }
        };

        if !value.is_array() {
            warn!("Ignoring quote file {:?}: not a JSON array", path);
            return Ok(None);
        }

        match serde_json::from_value::<Vec<Quote>>(value) {
            Ok(quotes) => Ok(Some(quotes)),
            Err(e) => {
                warn!("Ignoring quote file {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Save the last quote shown
    pub fn save_last_quote(&self, quote: &Quote) -> StorageResult<()> {
        let path = self.config.last_quote_path();
        let json = serde_json::to_vec(quote).map_err(|source| StorageError::Encode {
            path: path.clone(),
            source,
        })?;
        atomic_write(&path, &json)
    }

    /// Load the last quote shown, if any readable one is stored
    pub fn load_last_quote(&self) -> StorageResult<Option<Quote>> {
        let path = self.config.last_quote_path();
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };

        match serde_json::from_slice(&bytes) {
            Ok(quote) => Ok(Some(quote)),
            Err(e) => {
                warn!("Ignoring unreadable last quote {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Save the last selected category
    pub fn save_selected_category(&self, value: &str) -> StorageResult<()> {
        atomic_write(&self.config.selected_category_path(), value.as_bytes())
    }

    /// Load the last selected category
    pub fn load_selected_category(&self) -> StorageResult<Option<String>> {
        let path = self.config.selected_category_path();
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };

        match String::from_utf8(bytes) {
            Ok(s) => Ok(Some(s.trim().to_string()).filter(|s| !s.is_empty())),
            Err(e) => {
                warn!("Ignoring unreadable selected category {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// File sizes for status reporting
    pub fn stats(&self) -> StorageStats {
        let size_of = |path: &Path| fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let quotes_path = self.config.quotes_path();
        StorageStats {
            quotes_exists: quotes_path.exists(),
            quotes_size: size_of(&quotes_path),
            last_quote_size: size_of(&self.config.last_quote_path()),
        }
    }
}

/// Read a file's raw bytes, treating a missing file as `None`
///
/// Decoding is left to the caller so bad content never becomes an I/O error.
fn read_optional(path: &Path) -> StorageResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::read(path.to_path_buf(), e)),
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// On failure the temp file is removed and the target is left as it was.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("tmp");

    let result = write_synced(&temp_path, data)
        .map_err(|e| StorageError::write(temp_path.clone(), e))
        .and_then(|()| {
            fs::rename(&temp_path, path).map_err(|e| StorageError::write(path.to_path_buf(), e))
        });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_save_and_load_quotes() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        assert!(!persistence.stats().quotes_exists);
        assert!(persistence.load_quotes().unwrap().is_none());

        let quotes = vec![Quote::new("a", "X"), Quote::new("b", "Y")];
        persistence.save_quotes(&quotes).unwrap();
        assert!(persistence.stats().quotes_exists);

        let loaded = persistence.load_quotes().unwrap().unwrap();
        assert_eq!(loaded, quotes);
    }

    #[test]
    fn test_load_ignores_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        fs::write(config.quotes_path(), "{not json").unwrap();

        let persistence = JsonPersistence::new(config);
        assert!(persistence.load_quotes().unwrap().is_none());
    }

    #[test]
    fn test_load_ignores_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        fs::write(config.quotes_path(), [0xff, 0xfe, b'[', b']']).unwrap();
        fs::write(config.last_quote_path(), [0xc3, 0x28]).unwrap();
        fs::write(config.selected_category_path(), [0xff, b'x']).unwrap();

        let persistence = JsonPersistence::new(config);
        assert!(persistence.load_quotes().unwrap().is_none());
        assert!(persistence.load_last_quote().unwrap().is_none());
        assert!(persistence.load_selected_category().unwrap().is_none());
    }

    #[test]
    fn test_load_ignores_non_array() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        fs::write(config.quotes_path(), r#"{"text": "a", "category": "X"}"#).unwrap();

        let persistence = JsonPersistence::new(config);
        assert!(persistence.load_quotes().unwrap().is_none());
    }

    #[test]
    fn test_load_keeps_incomplete_entries() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        fs::write(config.quotes_path(), r#"[{"text": "a"}, {"category": "X"}]"#).unwrap();

        let persistence = JsonPersistence::new(config);
        let loaded = persistence.load_quotes().unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].category, "");
        assert_eq!(loaded[1].text, "");
    }

    #[test]
    fn test_last_quote_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        assert!(persistence.load_last_quote().unwrap().is_none());

        let quote = Quote::new("shown", "Success");
        persistence.save_last_quote(&quote).unwrap();
        assert_eq!(persistence.load_last_quote().unwrap(), Some(quote));
    }

    #[test]
    fn test_selected_category_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        assert!(persistence.load_selected_category().unwrap().is_none());

        persistence.save_selected_category("motivation").unwrap();
        assert_eq!(
            persistence.load_selected_category().unwrap(),
            Some("motivation".to_string())
        );
    }

    #[test]
    fn test_stats() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = JsonPersistence::new(test_config(&temp_dir));

        assert!(!persistence.stats().quotes_exists);

        persistence.save_quotes(&[Quote::new("a", "X")]).unwrap();
        persistence.save_last_quote(&Quote::new("a", "X")).unwrap();

        let stats = persistence.stats();
        assert!(stats.quotes_exists);
        assert!(stats.total_size() > 0);
        assert!(stats.total_size_human().ends_with(" B"));
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("b").join("file.txt");

        atomic_write(&nested_path, b"test data").unwrap();

        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }

    #[test]
    fn test_failed_atomic_write_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("quotes.json");
        fs::create_dir(&target).unwrap();

        let err = atomic_write(&target, b"[]").unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
        assert!(!temp_dir.path().join("quotes.tmp").exists());
        assert!(target.is_dir());
    }
}
