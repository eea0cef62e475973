//! Background sync poller
//!
//! Runs reconciliation once at startup, then every `interval`, and whenever
//! a [`SyncCommand::SyncNow`] arrives. Runs are serialized inside the task.
//! Results are reported on the event channel for the UI to act on.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::reconcile::{Reconciler, SyncReport, SyncStatus};
use crate::store::SharedStore;

/// Commands sent to the poller task
#[derive(Debug)]
pub enum SyncCommand {
    /// Run reconciliation now
    SyncNow,
    /// Stop the task
    Shutdown,
}

/// Events from the poller task
#[derive(Debug)]
pub enum SyncEvent {
    /// A run finished
    Completed(SyncReport),
    /// A run failed
    Failed(String),
}

/// Handle for controlling the poller task
pub struct SyncHandle {
    pub command_tx: mpsc::Sender<SyncCommand>,
    pub event_rx: mpsc::Receiver<SyncEvent>,
    pub status_rx: watch::Receiver<SyncStatus>,
}

impl SyncHandle {
    /// Ask for an immediate run
    pub async fn sync_now(&self) {
        let _ = self.command_tx.send(SyncCommand::SyncNow).await;
    }

    /// Stop the poller
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(SyncCommand::Shutdown).await;
    }
}

/// Spawn the poller on the current tokio runtime
pub fn spawn_sync_poller(
    reconciler: Reconciler,
    store: SharedStore,
    interval: Duration,
) -> SyncHandle {
    let (command_tx, command_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(64);
    let status_rx = reconciler.subscribe_status();

    tokio::spawn(sync_poller_task(
        Arc::new(reconciler),
        store,
        interval,
        command_rx,
        event_tx,
    ));

    SyncHandle {
        command_tx,
        event_rx,
        status_rx,
    }
}

async fn sync_poller_task(
    reconciler: Arc<Reconciler>,
    store: SharedStore,
    interval: Duration,
    mut command_rx: mpsc::Receiver<SyncCommand>,
    event_tx: mpsc::Sender<SyncEvent>,
) {
    // First tick fires immediately: the startup run
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!("Periodic sync");
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SyncCommand::SyncNow) => debug!("Manual sync"),
                    Some(SyncCommand::Shutdown) | None => break,
                }
            }
        }

        let event = match reconciler.run(&store).await {
            Ok(report) => SyncEvent::Completed(report),
            Err(e) => SyncEvent::Failed(e.to_string()),
        };
        if event_tx.send(event).await.is_err() {
            break;
        }
    }

    debug!("Sync poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Quote;
    use crate::store::Store;
    use crate::sync::reconcile::test_server::serve;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_poller_runs_at_startup_and_on_demand() {
        let server = serve(200, r#"[{"title": "remote"}]"#).await;
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            server_url: server.url.clone(),
            ..Config::default()
        };
        let store = Store::open_with_config(config.clone()).unwrap().into_shared();
        let reconciler = Reconciler::from_config(&config).unwrap();

        let mut handle = spawn_sync_poller(reconciler, store.clone(), Duration::from_secs(3600));

        match handle.event_rx.recv().await {
            Some(SyncEvent::Completed(report)) => assert_eq!(report.merge.added, 1),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(store
            .lock()
            .await
            .quotes()
            .contains(&Quote::new("remote", "Server")));

        handle.sync_now().await;
        match handle.event_rx.recv().await {
            Some(SyncEvent::Completed(report)) => assert!(!report.changed()),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(*handle.status_rx.borrow(), SyncStatus::Synced);

        handle.shutdown().await;
        assert!(handle.event_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_poller_reports_failures() {
        let server = serve(404, "{}").await;
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            server_url: server.url.clone(),
            ..Config::default()
        };
        let store = Store::open_with_config(config.clone()).unwrap().into_shared();
        let reconciler = Reconciler::from_config(&config).unwrap();

        let mut handle = spawn_sync_poller(reconciler, store, Duration::from_secs(3600));

        match handle.event_rx.recv().await {
            Some(SyncEvent::Failed(msg)) => assert!(msg.contains("404")),
            other => panic!("unexpected event: {:?}", other),
        }
        handle.shutdown().await;
    }
}
