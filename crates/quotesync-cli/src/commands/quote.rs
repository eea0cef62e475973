//! Quote command handlers

use anyhow::{Context, Result};

use quotesync_core::catalog::filter_quotes;
use quotesync_core::{CategoryFilter, Command, Store};

use crate::output::Output;

/// Show a random quote, optionally switching category first
///
/// Without `--category` the remembered category is used.
pub fn show(store: &mut Store, category: Option<String>, output: &Output) -> Result<()> {
    let selection = match category {
        Some(ref c) => store.select_category(CategoryFilter::parse(c))?,
        None => store.next_quote()?,
    };

    output.print_selection(&selection);
    Ok(())
}

/// List quotes, optionally filtered by category
pub fn list(store: &Store, category: Option<String>, output: &Output) -> Result<()> {
    let filter = category
        .as_deref()
        .map(CategoryFilter::parse)
        .unwrap_or_default();

    output.print_quotes(&filter_quotes(store.quotes(), &filter));
    Ok(())
}

/// Add a new quote
pub fn add(store: &mut Store, text: String, category: String, output: &Output) -> Result<()> {
    let effects = store
        .dispatch(Command::AddQuote { text, category })
        .context("Failed to add quote")?;

    output.print_effects(&effects);
    if let Some(quote) = store.quotes().last() {
        output.message(&format!("  {}", quote));
    }
    Ok(())
}
