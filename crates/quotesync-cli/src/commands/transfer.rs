//! Import/export command handlers

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quotesync_core::transfer::{export_json, export_to_path, EXPORT_FILE_NAME};
use quotesync_core::Store;

use crate::output::Output;

/// Write the collection as indented JSON
///
/// `-` writes to stdout instead of a file.
pub fn export(store: &Store, path: Option<PathBuf>, output: &Output) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));

    if path == Path::new("-") {
        println!("{}", export_json(store.quotes())?);
        return Ok(());
    }

    export_to_path(&path, store.quotes())
        .with_context(|| format!("Failed to export quotes to {}", path.display()))?;

    output.success(&format!(
        "Exported {} quote(s) to {}",
        store.len(),
        path.display()
    ));
    Ok(())
}

/// Replace the collection with the contents of a JSON file
pub fn import(store: &mut Store, path: PathBuf, output: &Output) -> Result<()> {
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    // Rejected payloads leave the store untouched
    let effects = store.import(&contents)?;
    output.print_effects(&effects);
    output.message(&format!("  {} quote(s) loaded", store.len()));
    Ok(())
}
