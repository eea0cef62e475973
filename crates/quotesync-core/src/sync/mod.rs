//! Reconciliation with the remote quote endpoint
//!
//! ## Flow
//!
//! 1. Fetch up to `remote_limit` records and map them into quotes
//! 2. Merge into the local collection, keyed by lowercase text; the server
//!    wins category conflicts
//! 3. Persist and notify if anything changed
//! 4. Optionally push the merged collection back
//!
//! ## Usage
//!
//! ```ignore
//! let reconciler = Reconciler::from_config(&config)?;
//! let handle = spawn_sync_poller(reconciler, store, Duration::from_secs(30));
//! handle.sync_now().await;
//! ```

mod client;
mod merge;
mod poller;
mod reconcile;

pub use client::{map_remote_records, RemoteClient, SyncError};
pub use merge::{merge_remote, MergeReport};
pub use poller::{spawn_sync_poller, SyncCommand, SyncEvent, SyncHandle};
pub use reconcile::{Reconciler, SyncReport, SyncStatus};
