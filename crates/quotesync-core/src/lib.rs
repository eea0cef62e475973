//! quotesync Core Library
//!
//! This crate provides the core functionality for quotesync, a local-first
//! collection of short quotes grouped by category, loosely reconciled with a
//! remote endpoint.
//!
//! # Architecture
//!
//! - **Store**: owns the session state and writes every mutation to disk
//! - **Dispatcher**: user actions are commands reduced into new state plus
//!   side effects
//! - **Sync**: fetches remote quotes and merges them, server wins
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open_with_config(Config::load()?)?;
//!
//! // Add a quote
//! store.add("Simplicity is prerequisite for reliability.", "Engineering")?;
//!
//! // Show one from a category
//! let selection = store.select_category(CategoryFilter::parse("Engineering"))?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Quote and category filter types
//! - `catalog`: Category index and random selection
//! - `dispatch`: Commands, effects and the reducer
//! - `transfer`: JSON import/export
//! - `storage`: JSON file persistence
//! - `sync`: Remote reconciliation and background polling
//! - `config`: Application configuration

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;
pub mod sync;
pub mod transfer;

pub use catalog::Selection;
pub use config::Config;
pub use dispatch::{Command, Effect};
pub use error::{QuoteError, QuoteResult};
pub use models::{CategoryFilter, Quote};
pub use storage::{JsonPersistence, StorageError, StorageStats};
pub use store::{SharedStore, Store};
