//! Unified storage interface
//!
//! The `Store` owns the session's [`QuoteBook`] and its persistence. All
//! mutations go through [`Store::dispatch`], which runs the pure reducer and
//! writes every requested persistence effect to disk before returning.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open_with_config(Config::load()?)?;  // Saved quotes or the defaults
//!
//! store.add("Stay hungry, stay foolish.", "Motivation")?;
//! let selection = store.next_quote()?;
//! ```
//!
//! When the store is shared with the background sync task, wrap it with
//! [`Store::into_shared`]; the mutex is the single-writer guard.

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::catalog::{category_counts, restore_filter, Selection};
use crate::config::Config;
use crate::dispatch::{reduce, Command, Effect, QuoteBook};
use crate::models::{default_quotes, CategoryFilter, Quote};
use crate::storage::{JsonPersistence, StorageStats};
use crate::sync::MergeReport;

/// Store shared between the UI and the sync task
pub type SharedStore = Arc<Mutex<Store>>;

/// Owner of the quote collection and its persisted state
pub struct Store {
    /// Current session state
    book: QuoteBook,
    /// JSON file persistence
    persistence: JsonPersistence,
    /// Configuration
    config: Config,
}

impl Store {
    /// Open the store with a specific configuration
    ///
    /// A missing or unusable quote file yields the built-in defaults.
    /// A remembered category is restored only if it still exists.
    pub fn open_with_config(config: Config) -> Result<Self> {
        let persistence = JsonPersistence::new(config.clone());

        let quotes = match persistence
            .load_quotes()
            .context("Failed to load quotes")?
        {
            Some(quotes) => {
                debug!("Loaded {} quotes", quotes.len());
                quotes
            }
            None => {
                info!("No saved quotes, starting from defaults");
                default_quotes()
            }
        };

        let filter = persistence
            .load_selected_category()
            .context("Failed to load selected category")?
            .map(|stored| restore_filter(&quotes, &stored))
            .unwrap_or_default();

        Ok(Self {
            book: QuoteBook::new(quotes, filter),
            persistence,
            config,
        })
    }

    /// Wrap the store for sharing across tasks
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Queries ====================

    /// The full collection, in insertion order
    pub fn quotes(&self) -> &[Quote] {
        &self.book.quotes
    }

    pub fn len(&self) -> usize {
        self.book.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.book.quotes.is_empty()
    }

    /// Current category filter
    pub fn filter(&self) -> &CategoryFilter {
        &self.book.filter
    }

    /// The category index, "all" first
    pub fn categories(&self) -> Vec<CategoryFilter> {
        self.book.categories()
    }

    /// Categories with the number of quotes in each
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        category_counts(&self.book.quotes)
    }

    /// What was selected most recently in this session
    pub fn display(&self) -> Option<&Selection> {
        self.book.display.as_ref()
    }

    /// The last quote shown, as persisted (possibly by an earlier session)
    pub fn last_quote(&self) -> Result<Option<Quote>> {
        self.persistence
            .load_last_quote()
            .context("Failed to load last quote")
    }

    /// Sizes of the persisted files
    pub fn storage_stats(&self) -> StorageStats {
        self.persistence.stats()
    }

    // ==================== Commands ====================

    /// Run a command with the thread-local RNG
    ///
    /// Returns the effects the caller still has to act on (render,
    /// notify, download, ...). Persistence effects are already done.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Effect>> {
        self.dispatch_with_rng(command, &mut rand::rng())
    }

    /// Run a command with a caller-provided RNG
    pub fn dispatch_with_rng<R: Rng + ?Sized>(
        &mut self,
        command: Command,
        rng: &mut R,
    ) -> Result<Vec<Effect>> {
        let transition = reduce(&self.book, command, rng)?;
        let next = transition.state;

        // The in-memory book follows the quote file: it only moves to the
        // new state once a requested collection write has landed.
        let mut quotes_saved = false;
        let mut remaining = Vec::new();
        for effect in transition.effects {
            let saved = match effect {
                Effect::PersistQuotes => {
                    let saved = self
                        .persistence
                        .save_quotes(&next.quotes)
                        .context("Failed to save quotes");
                    quotes_saved = saved.is_ok();
                    saved
                }
                Effect::PersistLastQuote(ref quote) => self
                    .persistence
                    .save_last_quote(quote)
                    .context("Failed to save last quote"),
                Effect::PersistSelectedCategory(ref value) => self
                    .persistence
                    .save_selected_category(value)
                    .context("Failed to save selected category"),
                other => {
                    remaining.push(other);
                    Ok(())
                }
            };

            if let Err(e) = saved {
                if quotes_saved {
                    self.book = next;
                }
                return Err(e);
            }
        }

        self.book = next;
        Ok(remaining)
    }

    /// Append a quote (input is trimmed; blank fields are rejected)
    pub fn add(&mut self, text: &str, category: &str) -> Result<()> {
        self.dispatch(Command::AddQuote {
            text: text.to_string(),
            category: category.to_string(),
        })?;
        Ok(())
    }

    /// Replace the whole collection and persist it
    pub fn replace(&mut self, quotes: Vec<Quote>) -> Result<()> {
        self.persistence
            .save_quotes(&quotes)
            .context("Failed to save quotes")?;
        self.book.filter = restore_filter(&quotes, &self.book.filter.storage_value());
        self.book.quotes = quotes;
        Ok(())
    }

    /// Change the category filter and pick a quote from it
    pub fn select_category(&mut self, filter: CategoryFilter) -> Result<Selection> {
        let effects = self.dispatch(Command::SelectCategory(filter))?;
        Ok(rendered(&effects))
    }

    /// Pick another quote from the current filter
    pub fn next_quote(&mut self) -> Result<Selection> {
        let effects = self.dispatch(Command::NextQuote)?;
        Ok(rendered(&effects))
    }

    /// Replace the collection from import file contents
    pub fn import(&mut self, contents: &str) -> Result<Vec<Effect>> {
        self.dispatch(Command::Import(contents.to_string()))
    }

    /// Merge a remote snapshot (server wins)
    pub fn apply_remote(&mut self, remote: Vec<Quote>) -> Result<(MergeReport, Vec<Effect>)> {
        let effects = self.dispatch(Command::ApplyRemote(remote))?;
        let report = effects
            .iter()
            .find_map(|e| match e {
                Effect::Merged(report) => Some(*report),
                _ => None,
            })
            .unwrap_or_default();
        Ok((report, effects))
    }
}

/// The selection rendered by a command, `NoQuotes` if none was
fn rendered(effects: &[Effect]) -> Selection {
    effects
        .iter()
        .rev()
        .find_map(|e| match e {
            Effect::Render(selection) => Some(selection.clone()),
            _ => None,
        })
        .unwrap_or(Selection::NoQuotes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MERGED_NOTICE;
    use crate::error::QuoteError;
    use crate::transfer::export_json;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_open_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open_with_config(test_config(&temp_dir)).unwrap();

        assert_eq!(store.quotes(), default_quotes().as_slice());
        assert_eq!(*store.filter(), CategoryFilter::All);
        assert!(store.display().is_none());
    }

    #[test]
    fn test_open_falls_back_on_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        fs::write(config.quotes_path(), "\"just a string\"").unwrap();

        let store = Store::open_with_config(config).unwrap();
        assert_eq!(store.quotes(), default_quotes().as_slice());
    }

    #[test]
    fn test_add_persists() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        {
            let mut store = Store::open_with_config(config.clone()).unwrap();
            store.add("  Persisted  ", " Memory ").unwrap();
            assert_eq!(store.len(), 5);
        }

        let store = Store::open_with_config(config).unwrap();
        assert_eq!(store.len(), 5);
        assert_eq!(store.quotes()[4], Quote::new("Persisted", "Memory"));
    }

    #[test]
    fn test_add_validation_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = Store::open_with_config(config.clone()).unwrap();

        let err = store.add("   ", "Category").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QuoteError>(),
            Some(QuoteError::Validation)
        ));
        assert_eq!(store.len(), 4);
        // Nothing was written
        assert!(!config.quotes_path().exists());
    }

    #[test]
    fn test_failed_save_leaves_store_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = Store::open_with_config(config.clone()).unwrap();

        // A directory in place of the quote file makes the rename fail
        fs::create_dir(config.quotes_path()).unwrap();

        assert!(store.add("Written nowhere", "Lost").is_err());
        assert_eq!(store.len(), 4);
        assert!(!store.categories().contains(&CategoryFilter::parse("Lost")));
        assert!(!config.quotes_path().with_extension("tmp").exists());

        assert!(store.replace(Vec::new()).is_err());
        assert_eq!(store.quotes(), default_quotes().as_slice());
    }

    #[test]
    fn test_open_falls_back_on_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        fs::write(config.quotes_path(), [0xff, 0xfe, b'[', b']']).unwrap();

        let store = Store::open_with_config(config).unwrap();
        assert_eq!(store.quotes(), default_quotes().as_slice());
    }

    #[test]
    fn test_select_category_persists_state() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        {
            let mut store = Store::open_with_config(config.clone()).unwrap();
            let selection = store
                .select_category(CategoryFilter::parse("Success"))
                .unwrap();
            assert_eq!(selection.quote().unwrap().category, "Success");
            assert_eq!(store.last_quote().unwrap().unwrap().category, "Success");
        }

        let store = Store::open_with_config(config).unwrap();
        assert_eq!(
            *store.filter(),
            CategoryFilter::Named("Success".to_string())
        );
    }

    #[test]
    fn test_empty_category_keeps_last_quote() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = Store::open_with_config(test_config(&temp_dir)).unwrap();

        store.replace(vec![Quote::new("a", "Success")]).unwrap();
        let first = store.next_quote().unwrap();
        assert_eq!(first.quote(), Some(&Quote::new("a", "Success")));

        let selection = store
            .select_category(CategoryFilter::parse("Motivation"))
            .unwrap();
        assert_eq!(selection, Selection::NoQuotes);
        assert_eq!(
            store.last_quote().unwrap(),
            Some(Quote::new("a", "Success"))
        );
    }

    #[test]
    fn test_export_import_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = Store::open_with_config(test_config(&temp_dir)).unwrap();
        store.add("Extra", "Bonus").unwrap();
        let original = store.quotes().to_vec();

        let exported = export_json(store.quotes()).unwrap();
        store.replace(Vec::new()).unwrap();
        assert!(store.is_empty());

        store.import(&exported).unwrap();
        assert_eq!(store.quotes(), original.as_slice());
    }

    #[test]
    fn test_import_rejects_non_array() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = Store::open_with_config(test_config(&temp_dir)).unwrap();

        let err = store.import(r#"{"quotes": []}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<QuoteError>(),
            Some(QuoteError::NotAnArray)
        ));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_apply_remote_server_wins() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);
        let mut store = Store::open_with_config(config.clone()).unwrap();
        store.replace(vec![Quote::new("a", "X")]).unwrap();

        let (report, effects) = store.apply_remote(vec![Quote::new("a", "Y")]).unwrap();
        assert_eq!(report.updated, 1);
        assert!(effects.contains(&Effect::Notify(MERGED_NOTICE.to_string())));
        assert_eq!(store.quotes(), &[Quote::new("a", "Y")]);

        // Merge result is persisted
        let reopened = Store::open_with_config(config).unwrap();
        assert_eq!(reopened.quotes(), &[Quote::new("a", "Y")]);
    }

    #[test]
    fn test_apply_remote_twice_is_quiet() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = Store::open_with_config(test_config(&temp_dir)).unwrap();
        store.replace(Vec::new()).unwrap();

        let remote = vec![Quote::new("b", "Server")];
        let (first, _) = store.apply_remote(remote.clone()).unwrap();
        assert_eq!(first.added, 1);
        assert_eq!(store.quotes(), &[Quote::new("b", "Server")]);

        let (second, effects) = store.apply_remote(remote).unwrap();
        assert!(!second.changed());
        assert!(effects.is_empty());
    }
}
