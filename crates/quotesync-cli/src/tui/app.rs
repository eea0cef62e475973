//! Application state and logic

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use quotesync_core::catalog::Selection;
use quotesync_core::sync::{SyncReport, SyncStatus};
use quotesync_core::transfer::write_export;
use quotesync_core::{CategoryFilter, Command, Effect, Store};
use tracing::debug;

/// How long a status message stays visible
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Quote entry form (after pressing a)
    Add(AddField),
    /// Import path prompt (after pressing i)
    Import,
}

/// Field being edited in the entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Text,
    Category,
}

/// Application state
pub struct App {
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Line being edited at the bottom
    pub input: String,
    /// Cursor position in `input`, in chars
    pub cursor: usize,
    /// Quote text captured by the first form step
    pub draft_text: String,
    /// Category selector entries ("All Categories" first)
    pub categories: Vec<CategoryFilter>,
    /// Quotes per category, keyed like `categories`
    pub counts: Vec<(String, usize)>,
    /// Size of the whole collection
    pub total: usize,
    /// Currently selected category index
    pub category_index: usize,
    /// What the quote pane shows
    pub display: Selection,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Whether the background sync task runs
    pub sync_enabled: bool,
    /// Latest reconciliation status
    pub sync_status: SyncStatus,
    /// When the last successful run finished
    pub last_synced: Option<DateTime<Utc>>,
    /// Directory the export artifact is written to
    pub export_dir: PathBuf,
}

impl App {
    /// Create a new app with data from store
    ///
    /// The pane starts on the last shown quote, or a fresh pick if none
    /// was remembered.
    pub fn new(store: &mut Store) -> anyhow::Result<Self> {
        let display = match store.last_quote()? {
            Some(quote) if store.filter().matches(&quote) => Selection::Quote(quote),
            _ => store.next_quote()?,
        };

        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            input: String::new(),
            cursor: 0,
            draft_text: String::new(),
            categories: Vec::new(),
            counts: Vec::new(),
            total: 0,
            category_index: 0,
            display,
            status_message: None,
            status_message_time: None,
            show_help: false,
            sync_enabled: store.config().sync_enabled,
            sync_status: SyncStatus::Idle,
            last_synced: None,
            export_dir: PathBuf::from("."),
        };
        app.refresh_categories(store);
        Ok(app)
    }

    /// Rebuild the category selector, keeping the store's filter selected
    pub fn refresh_categories(&mut self, store: &Store) {
        self.categories = store.categories();
        self.counts = store.category_counts();
        self.total = store.len();
        self.category_index = self
            .categories
            .iter()
            .position(|c| c == store.filter())
            .unwrap_or(0);
    }

    /// Currently highlighted category
    pub fn current_category(&self) -> Option<&CategoryFilter> {
        self.categories.get(self.category_index)
    }

    /// Number of quotes in the highlighted category
    pub fn current_count(&self) -> usize {
        match self.current_category() {
            Some(CategoryFilter::All) => self.total,
            Some(CategoryFilter::Named(name)) => self
                .counts
                .iter()
                .find(|(label, _)| label == name)
                .map(|(_, n)| *n)
                .unwrap_or(0),
            None => 0,
        }
    }

    /// Set a status message (will auto-dismiss after 3 seconds)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed() > STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Sync indicator text for the status bar
    pub fn sync_label(&self) -> String {
        if !self.sync_enabled {
            return "Sync: Off".to_string();
        }
        match (self.sync_status, self.last_synced) {
            (SyncStatus::Synced, Some(at)) => format!(
                "{} ({})",
                self.sync_status,
                at.with_timezone(&Local).format("%H:%M:%S")
            ),
            (status, _) => status.to_string(),
        }
    }

    // ==================== Navigation ====================

    /// Move the category selection up and show a quote from it
    pub fn move_up(&mut self, store: &mut Store) -> anyhow::Result<()> {
        if self.category_index > 0 {
            self.category_index -= 1;
            self.select_current_category(store)?;
        }
        Ok(())
    }

    /// Move the category selection down and show a quote from it
    pub fn move_down(&mut self, store: &mut Store) -> anyhow::Result<()> {
        if self.category_index < self.categories.len().saturating_sub(1) {
            self.category_index += 1;
            self.select_current_category(store)?;
        }
        Ok(())
    }

    fn select_current_category(&mut self, store: &mut Store) -> anyhow::Result<()> {
        let Some(filter) = self.current_category().cloned() else {
            return Ok(());
        };
        let effects = store.dispatch(Command::SelectCategory(filter))?;
        self.apply_effects(store, effects)
    }

    /// Show another quote from the current category
    pub fn next_quote(&mut self, store: &mut Store) -> anyhow::Result<()> {
        let effects = store.dispatch(Command::NextQuote)?;
        self.apply_effects(store, effects)
    }

    // ==================== Effects ====================

    /// Act on the effects the store handed back
    pub fn apply_effects(&mut self, store: &Store, effects: Vec<Effect>) -> anyhow::Result<()> {
        for effect in effects {
            match effect {
                Effect::RefreshCategories => self.refresh_categories(store),
                Effect::Render(selection) => self.display = selection,
                Effect::Notify(message) => self.set_status(message),
                Effect::Download {
                    file_name,
                    contents,
                } => {
                    let path = self.export_dir.join(&file_name);
                    write_export(&path, &contents)?;
                    self.set_status(format!("Exported {} quotes to {}", store.len(), file_name));
                }
                Effect::Merged(report) => {
                    debug!(
                        "Merged remote quotes: {} added, {} updated",
                        report.added, report.updated
                    );
                }
                Effect::PersistQuotes
                | Effect::PersistLastQuote(_)
                | Effect::PersistSelectedCategory(_) => {}
            }
        }
        Ok(())
    }

    /// Record a finished sync run and apply what it changed
    pub fn sync_completed(&mut self, store: &Store, report: SyncReport) -> anyhow::Result<()> {
        self.last_synced = Some(report.finished_at);
        self.apply_effects(store, report.effects)
    }

    // ==================== Actions ====================

    /// Write the export artifact
    pub fn export(&mut self, store: &mut Store) -> anyhow::Result<()> {
        let effects = store.dispatch(Command::Export)?;
        self.apply_effects(store, effects)
    }

    /// Submit the current input for the active prompt
    ///
    /// Rejected input is reported in the status bar and the prompt closes.
    pub fn submit(&mut self, store: &mut Store) -> anyhow::Result<()> {
        match self.input_mode {
            InputMode::Normal => {}
            InputMode::Add(AddField::Text) => {
                self.draft_text = std::mem::take(&mut self.input);
                self.cursor = 0;
                self.input_mode = InputMode::Add(AddField::Category);
            }
            InputMode::Add(AddField::Category) => {
                let command = Command::AddQuote {
                    text: std::mem::take(&mut self.draft_text),
                    category: std::mem::take(&mut self.input),
                };
                self.exit_input_mode();
                let effects = store.dispatch(command)?;
                self.apply_effects(store, effects)?;
            }
            InputMode::Import => {
                let path = PathBuf::from(self.input.trim());
                self.exit_input_mode();
                let contents = fs::read_to_string(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to read {}: {}", path.display(), e)
                })?;
                let effects = store.import(&contents)?;
                self.apply_effects(store, effects)?;
            }
        }
        Ok(())
    }

    // ==================== Input ====================

    /// Open the quote entry form
    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Add(AddField::Text);
        self.input.clear();
        self.cursor = 0;
        self.draft_text.clear();
    }

    /// Open the import path prompt
    pub fn enter_import_mode(&mut self) {
        self.input_mode = InputMode::Import;
        self.input.clear();
        self.cursor = 0;
    }

    /// Close any prompt and discard its input
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
        self.cursor = 0;
        self.draft_text.clear();
    }

    /// Insert character at cursor position
    pub fn insert_char(&mut self, c: char) {
        let at = byte_offset(&self.input, self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = byte_offset(&self.input, self.cursor);
            self.input.remove(at);
        }
    }

    /// Move cursor left
    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right
    pub fn cursor_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }
}

fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}
