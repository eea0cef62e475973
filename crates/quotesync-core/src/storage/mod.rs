//! Storage layer
//!
//! Persists the quote collection and selection state as JSON files in the
//! data directory. Writes are atomic; reads of damaged content fall back to
//! "nothing stored" so the caller can substitute defaults.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{JsonPersistence, StorageStats};
