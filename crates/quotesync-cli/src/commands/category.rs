//! Category command handlers

use anyhow::Result;

use quotesync_core::Store;

use crate::output::Output;

/// List all categories with usage counts
pub fn list(store: &Store, output: &Output) -> Result<()> {
    output.print_categories(&store.category_counts());
    Ok(())
}
