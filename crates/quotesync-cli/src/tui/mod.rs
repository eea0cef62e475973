//! quotesync TUI
//!
//! Terminal user interface for browsing and collecting quotes.
//!
//! ## Layout
//!
//! - Left: category selector ("All Categories" first)
//! - Right: the displayed quote
//! - Bottom: status bar with notifications and the sync indicator
//!
//! ## Keys
//!
//! - j/k or ↑/↓: Change category (shows a quote from it)
//! - n: Show another quote
//! - a: Add a quote (text, then category)
//! - e: Export to quotes.json
//! - i: Import from a JSON file
//! - s: Sync now
//! - ?: Help
//! - q: Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quotesync_core::sync::{spawn_sync_poller, Reconciler, SyncEvent, SyncHandle};
use quotesync_core::{Config, QuoteError, SharedStore, Store};

use app::{App, InputMode};

/// Run the TUI application
pub async fn run(store: Store) -> Result<()> {
    let config = store.config().clone();

    // Initialize TUI logging (file-based, only if QUOTESYNC_LOG is set)
    init_tui_logging(&config);

    let mut store = store;
    let mut app = App::new(&mut store)?;
    let store = store.into_shared();

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Start the poller if enabled; its first tick is the startup run
    let sync_handle = if config.sync_enabled {
        match Reconciler::from_config(&config) {
            Ok(reconciler) => Some(spawn_sync_poller(
                reconciler,
                store.clone(),
                Duration::from_secs(config.sync_interval_secs.max(1)),
            )),
            Err(e) => {
                warn!("Sync disabled for this session: {}", e);
                app.set_status(format!("Sync unavailable: {}", e));
                None
            }
        }
    } else {
        None
    };

    let result = run_app(&mut terminal, &mut app, &store, sync_handle).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &SharedStore,
    mut sync_handle: Option<SyncHandle>,
) -> Result<()> {
    loop {
        app.check_status_timeout();

        if let Some(ref handle) = sync_handle {
            app.sync_status = *handle.status_rx.borrow();
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            biased;

            sync_event = async {
                if let Some(ref mut handle) = sync_handle {
                    handle.event_rx.recv().await
                } else {
                    // Never resolves if no sync handle
                    std::future::pending::<Option<SyncEvent>>().await
                }
            } => {
                match sync_event {
                    Some(SyncEvent::Completed(report)) => {
                        let guard = store.lock().await;
                        if let Err(e) = app.sync_completed(&guard, report) {
                            app.set_status(format!("Failed to refresh after sync: {}", e));
                        }
                    }
                    Some(SyncEvent::Failed(msg)) => {
                        app.set_status(format!("Sync failed: {}", msg));
                    }
                    None => {
                        // Poller is gone; stop listening
                        sync_handle = None;
                    }
                }
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        // If help is showing, any key dismisses it
                        if app.show_help {
                            app.show_help = false;
                            continue;
                        }

                        match app.input_mode {
                            InputMode::Normal => {
                                handle_normal_mode(app, store, sync_handle.as_ref(), key.code, key.modifiers).await;
                            }
                            InputMode::Add(_) | InputMode::Import => {
                                handle_input_mode(app, store, key.code, key.modifiers).await;
                            }
                        }
                    }
                }
            }
        }

        if app.should_quit {
            if let Some(handle) = sync_handle.take() {
                handle.shutdown().await;
            }
            break;
        }
    }

    Ok(())
}

/// Handle key events in normal mode
///
/// Failures are shown in the status bar; the session keeps running.
async fn handle_normal_mode(
    app: &mut App,
    store: &SharedStore,
    sync_handle: Option<&SyncHandle>,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    let result = match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            Ok(())
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            Ok(())
        }

        KeyCode::Char('k') | KeyCode::Up => app.move_up(&mut *store.lock().await),
        KeyCode::Char('j') | KeyCode::Down => app.move_down(&mut *store.lock().await),
        KeyCode::Char('n') => app.next_quote(&mut *store.lock().await),

        KeyCode::Char('a') => {
            app.enter_add_mode();
            Ok(())
        }
        KeyCode::Char('i') => {
            app.enter_import_mode();
            Ok(())
        }
        KeyCode::Char('e') => app.export(&mut *store.lock().await),

        KeyCode::Char('s') => {
            match sync_handle {
                Some(handle) => handle.sync_now().await,
                None => app.set_status("Sync is disabled"),
            }
            Ok(())
        }

        KeyCode::Char('?') => {
            app.toggle_help();
            Ok(())
        }

        _ => Ok(()),
    };

    if let Err(e) = result {
        app.set_status(error_message(&e));
    }
}

/// Handle key events while a prompt is open
async fn handle_input_mode(
    app: &mut App,
    store: &SharedStore,
    code: KeyCode,
    modifiers: KeyModifiers,
) {
    match code {
        KeyCode::Esc => {
            app.exit_input_mode();
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.exit_input_mode();
        }
        KeyCode::Enter => {
            if let Err(e) = app.submit(&mut *store.lock().await) {
                app.set_status(error_message(&e));
            }
        }
        KeyCode::Char(c) => {
            app.insert_char(c);
        }
        KeyCode::Backspace => {
            app.delete_char();
        }
        KeyCode::Left => {
            app.cursor_left();
        }
        KeyCode::Right => {
            app.cursor_right();
        }
        _ => {}
    }
}

/// Status bar text for a failed action
///
/// Rejected input is shown as is; anything else gets the full cause chain.
fn error_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<QuoteError>() {
        Some(e) if e.is_user_error() => e.to_string(),
        _ => format!("Error: {:#}", error),
    }
}

/// Initialize logging for TUI mode
///
/// Only initializes if QUOTESYNC_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var("QUOTESYNC_LOG") else {
        return;
    };

    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(|| config.data_dir.join("debug.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "quotesync_core={},quotesync_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}
