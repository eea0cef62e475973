//! Data models for quotesync
//!
//! Defines the core data structures: `Quote` and the `CategoryFilter`
//! used to restrict which quotes are shown.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display text of the "all" category sentinel
pub const ALL_CATEGORIES: &str = "All Categories";

/// A short text quote with a category
///
/// Quotes have no identifier. For merging, a quote is identified by its
/// lowercase text (see [`Quote::key`]).
///
/// Both fields default to empty strings when missing so that hand-edited
/// or imported records load without complaint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Quote {
    /// The quote itself
    #[serde(default)]
    pub text: String,
    /// Free-form category label
    #[serde(default)]
    pub category: String,
}

impl Quote {
    /// Create a new quote
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Merge key: the lowercased text
    pub fn key(&self) -> String {
        self.text.to_lowercase()
    }

    /// Whether this quote belongs to `category` (case-insensitive)
    pub fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({})", self.text, self.category)
    }
}

/// The collection shipped with a fresh install
pub fn default_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            "The best way to get started is to quit talking and begin doing.",
            "Motivation",
        ),
        Quote::new(
            "Don't let yesterday take up too much of today.",
            "Inspiration",
        ),
        Quote::new(
            "Success is not in what you have, but who you are.",
            "Success",
        ),
        Quote::new(
            "Act as if what you do makes a difference. It does.",
            "Positivity",
        ),
    ]
}

/// Category selection: either no restriction or one named category
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// The "all" sentinel
    #[default]
    All,
    /// A single category, matched case-insensitively
    Named(String),
}

impl CategoryFilter {
    /// Parse user input into a filter
    ///
    /// Empty input, "all" and "all categories" (any case) mean no restriction.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_lowercase();
        if lower.is_empty() || lower == "all" || lower == ALL_CATEGORIES.to_lowercase() {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(trimmed.to_string())
        }
    }

    /// Whether the filter admits the quote
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => quote.in_category(name),
        }
    }

    /// Value written to the persisted selection
    pub fn storage_value(&self) -> String {
        match self {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Named(name) => name.to_lowercase(),
        }
    }

    /// Label shown to the user
    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Named(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
