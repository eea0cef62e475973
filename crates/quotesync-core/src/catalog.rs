//! Category index and display selection
//!
//! Both are pure functions of the current collection and are recomputed
//! on every call rather than maintained incrementally.

use rand::Rng;

use crate::models::{CategoryFilter, Quote};

/// Text shown when the selected category has no quotes
pub const NO_QUOTES_MESSAGE: &str = "No quotes found for this category.";

/// Outcome of picking a quote to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A quote was chosen
    Quote(Quote),
    /// The filtered subset was empty
    NoQuotes,
}

impl Selection {
    /// Text to display for this outcome
    pub fn display_text(&self) -> &str {
        match self {
            Selection::Quote(quote) => &quote.text,
            Selection::NoQuotes => NO_QUOTES_MESSAGE,
        }
    }

    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Selection::Quote(quote) => Some(quote),
            Selection::NoQuotes => None,
        }
    }
}

/// Build the category index: the "all" sentinel followed by every distinct
/// category in first-seen order
pub fn derive_categories(quotes: &[Quote]) -> Vec<CategoryFilter> {
    let mut categories = vec![CategoryFilter::All];
    for quote in quotes {
        let already_seen = categories.iter().any(|c| match c {
            CategoryFilter::Named(name) => *name == quote.category,
            CategoryFilter::All => false,
        });
        if !already_seen {
            categories.push(CategoryFilter::Named(quote.category.clone()));
        }
    }
    categories
}

/// Count quotes per category, in category index order (sentinel excluded)
///
/// Each count is the number of quotes selecting that entry would draw
/// from, so labels differing only in case share one total.
pub fn category_counts(quotes: &[Quote]) -> Vec<(String, usize)> {
    derive_categories(quotes)
        .into_iter()
        .filter(|c| *c != CategoryFilter::All)
        .map(|c| {
            let count = filter_quotes(quotes, &c).len();
            (c.label().to_string(), count)
        })
        .collect()
}

/// Quotes admitted by the filter, in collection order
pub fn filter_quotes<'a>(quotes: &'a [Quote], filter: &CategoryFilter) -> Vec<&'a Quote> {
    quotes.iter().filter(|q| filter.matches(q)).collect()
}

/// Pick one quote uniformly at random from the filtered subset
pub fn select_quote<R: Rng + ?Sized>(
    quotes: &[Quote],
    filter: &CategoryFilter,
    rng: &mut R,
) -> Selection {
    let candidates = filter_quotes(quotes, filter);
    if candidates.is_empty() {
        return Selection::NoQuotes;
    }
    let index = rng.random_range(0..candidates.len());
    Selection::Quote(candidates[index].clone())
}

/// Resolve a persisted category value against the current index
///
/// Returns `All` when the stored value no longer names a known category.
pub fn restore_filter(quotes: &[Quote], stored: &str) -> CategoryFilter {
    match CategoryFilter::parse(stored) {
        CategoryFilter::All => CategoryFilter::All,
        CategoryFilter::Named(name) => derive_categories(quotes)
            .into_iter()
            .find(|c| match c {
                CategoryFilter::Named(known) => known.to_lowercase() == name.to_lowercase(),
                CategoryFilter::All => false,
            })
            .unwrap_or(CategoryFilter::All),
    }
}
