//! Sync command handler

use anyhow::{Context, Result};

use quotesync_core::sync::Reconciler;
use quotesync_core::{Config, SharedStore};

use crate::output::Output;

/// Reconcile with the remote endpoint once
///
/// `push` forces a push of the merged collection even when
/// `push_after_sync` is off.
pub async fn sync(store: &SharedStore, config: &Config, push: bool, output: &Output) -> Result<()> {
    let reconciler = Reconciler::from_config(config)
        .context("Failed to set up sync")?
        .with_push(push || config.push_after_sync);

    output.message(&format!("Syncing with {}...", reconciler.client().url()));

    let report = match reconciler.run(store).await {
        Ok(report) => report,
        Err(e) => {
            output.message(&reconciler.status().to_string());
            return Err(e).context("Sync failed");
        }
    };

    if report.changed() {
        output.print_effects(&report.effects);
        output.message(&format!(
            "  Added: {}, Updated: {}, Total: {}",
            report.merge.added,
            report.merge.updated,
            store.lock().await.len()
        ));
    } else {
        output.success("Sync complete - already up to date");
    }

    if let Some(status) = report.pushed {
        output.message(&format!("  Pushed local quotes (server answered {})", status));
    }

    Ok(())
}

/// Sync quietly (for auto-sync before reads) - no output on success
pub async fn sync_quiet(store: &SharedStore, config: &Config) -> Result<()> {
    let reconciler = Reconciler::from_config(config)?;
    reconciler.run(store).await?;
    Ok(())
}
