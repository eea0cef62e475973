//! Reconciliation routine
//!
//! One run: fetch the remote snapshot, merge it into the store under the
//! store lock (server wins), and optionally push the merged collection
//! back. Progress is published on a `watch` channel as [`SyncStatus`].

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use super::client::{RemoteClient, SyncError};
use super::merge::MergeReport;
use crate::config::Config;
use crate::dispatch::Effect;
use crate::store::SharedStore;

/// Status indicator for reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Nothing has run yet
    Idle,
    /// A run is in progress
    Syncing,
    /// Last run succeeded
    Synced,
    /// Last run failed
    Failed,
}

impl SyncStatus {
    /// Indicator text
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::Idle => "Sync: Idle",
            SyncStatus::Syncing => "Syncing with server...",
            SyncStatus::Synced => "Synced with server",
            SyncStatus::Failed => "Sync failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Number of quotes mapped from the remote response
    pub fetched: usize,
    /// What the merge changed
    pub merge: MergeReport,
    /// UI effects produced by the merge (empty when nothing changed)
    pub effects: Vec<Effect>,
    /// Push response status, if a push was attempted and answered
    pub pushed: Option<u16>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        self.merge.changed()
    }
}

/// Runs reconciliation against one remote endpoint
pub struct Reconciler {
    client: RemoteClient,
    push_after_sync: bool,
    status: watch::Sender<SyncStatus>,
}

impl Reconciler {
    /// Create a reconciler for a client
    pub fn new(client: RemoteClient, push_after_sync: bool) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            client,
            push_after_sync,
            status,
        }
    }

    /// Create a reconciler from the sync settings in `config`
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        Ok(Self::new(
            RemoteClient::from_config(config)?,
            config.push_after_sync,
        ))
    }

    /// Override whether merged data is pushed back
    pub fn with_push(mut self, push: bool) -> Self {
        self.push_after_sync = push;
        self
    }

    /// Current status
    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Subscribe to status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn client(&self) -> &RemoteClient {
        &self.client
    }

    /// Run one reconciliation
    ///
    /// On failure the local collection is left untouched and the status
    /// becomes `Failed`; nothing is retried until the next run.
    pub async fn run(&self, store: &SharedStore) -> Result<SyncReport, SyncError> {
        self.status.send_replace(SyncStatus::Syncing);

        match self.run_inner(store).await {
            Ok(report) => {
                self.status.send_replace(SyncStatus::Synced);
                info!(
                    added = report.merge.added,
                    updated = report.merge.updated,
                    "Sync complete"
                );
                Ok(report)
            }
            Err(e) => {
                self.status.send_replace(SyncStatus::Failed);
                warn!("Sync failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run_inner(&self, store: &SharedStore) -> Result<SyncReport, SyncError> {
        // Network I/O happens without holding the store
        let remote = self.client.fetch().await?;
        let fetched = remote.len();

        let (merge, effects, pushed_quotes) = {
            let mut store = store.lock().await;
            let (merge, effects) = store.apply_remote(remote).map_err(SyncError::Apply)?;
            let snapshot = self.push_after_sync.then(|| store.quotes().to_vec());
            (merge, effects, snapshot)
        };

        let pushed = match pushed_quotes {
            Some(quotes) => match self.client.push(&quotes).await {
                Ok(status) => {
                    info!("Pushed {} quotes, server answered {}", quotes.len(), status);
                    Some(status.as_u16())
                }
                Err(e) => {
                    warn!("Push failed: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(SyncReport {
            fetched,
            merge,
            effects,
            pushed,
            finished_at: Utc::now(),
        })
    }
}
