//! Command dispatcher
//!
//! Every user action is a [`Command`]. [`reduce`] is pure: it takes the
//! current [`QuoteBook`] and returns the next one together with the
//! [`Effect`]s the caller has to carry out (persist, render, notify).
//! `Store::dispatch` executes the persistence effects and hands the rest
//! back to the UI.

use rand::Rng;

use crate::catalog::{derive_categories, restore_filter, select_quote, Selection};
use crate::error::{QuoteError, QuoteResult};
use crate::models::{CategoryFilter, Quote};
use crate::sync::{merge_remote, MergeReport};
use crate::transfer::{export_json, parse_import, EXPORT_FILE_NAME};

/// Shown after a successful add
pub const ADDED_NOTICE: &str = "Quote added successfully!";

/// Shown after a successful import
pub const IMPORTED_NOTICE: &str = "Quotes imported successfully!";

/// Shown once when a reconciliation changed local data
pub const MERGED_NOTICE: &str =
    "Quotes synced with server. Some conflicts were resolved using server data.";

/// A user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append a quote from the entry form (raw, untrimmed input)
    AddQuote { text: String, category: String },
    /// Change the category filter and show a quote from it
    SelectCategory(CategoryFilter),
    /// Show another random quote from the current filter
    NextQuote,
    /// Replace the collection with the contents of an import file
    Import(String),
    /// Produce the export artifact
    Export,
    /// Merge a remote snapshot, server wins
    ApplyRemote(Vec<Quote>),
}

/// Side effect requested by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the full collection to storage
    PersistQuotes,
    /// Remember the quote just shown
    PersistLastQuote(Quote),
    /// Remember the selected category
    PersistSelectedCategory(String),
    /// Category index changed; selectors must be rebuilt
    RefreshCategories,
    /// Display this selection
    Render(Selection),
    /// One-time message for the user
    Notify(String),
    /// Offer a file for download/saving
    Download { file_name: String, contents: String },
    /// A reconciliation changed local data
    Merged(MergeReport),
}

impl Effect {
    /// Effects `Store` handles itself
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Effect::PersistQuotes
                | Effect::PersistLastQuote(_)
                | Effect::PersistSelectedCategory(_)
        )
    }
}

/// Session state the reducer operates on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteBook {
    /// The quote collection
    pub quotes: Vec<Quote>,
    /// Current category filter
    pub filter: CategoryFilter,
    /// What is currently displayed, if anything has been selected yet
    pub display: Option<Selection>,
}

impl QuoteBook {
    pub fn new(quotes: Vec<Quote>, filter: CategoryFilter) -> Self {
        Self {
            quotes,
            filter,
            display: None,
        }
    }

    /// The category index for the current collection
    pub fn categories(&self) -> Vec<CategoryFilter> {
        derive_categories(&self.quotes)
    }
}

/// Result of reducing one command
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: QuoteBook,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &QuoteBook) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

/// Apply a command to the state
///
/// Returns an error, and no transition, when the command's input is
/// rejected. State is never partially updated.
pub fn reduce<R: Rng + ?Sized>(
    state: &QuoteBook,
    command: Command,
    rng: &mut R,
) -> QuoteResult<Transition> {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match command {
        Command::AddQuote { text, category } => {
            let text = text.trim();
            let category = category.trim();
            if text.is_empty() || category.is_empty() {
                return Err(QuoteError::Validation);
            }
            next.quotes.push(Quote::new(text, category));
            effects.push(Effect::PersistQuotes);
            effects.push(Effect::RefreshCategories);
            effects.push(Effect::Notify(ADDED_NOTICE.to_string()));
        }
        Command::SelectCategory(filter) => {
            effects.push(Effect::PersistSelectedCategory(filter.storage_value()));
            next.filter = filter;
            show_next(&mut next, &mut effects, rng);
        }
        Command::NextQuote => {
            show_next(&mut next, &mut effects, rng);
        }
        Command::Import(contents) => {
            next.quotes = parse_import(&contents)?;
            effects.push(Effect::PersistQuotes);
            refresh_categories(&mut next, &mut effects);
            show_next(&mut next, &mut effects, rng);
            effects.push(Effect::Notify(IMPORTED_NOTICE.to_string()));
        }
        Command::Export => {
            effects.push(Effect::Download {
                file_name: EXPORT_FILE_NAME.to_string(),
                contents: export_json(&state.quotes)?,
            });
        }
        Command::ApplyRemote(remote) => {
            let report = merge_remote(&mut next.quotes, &remote);
            if !report.changed() {
                return Ok(Transition::unchanged(state));
            }
            effects.push(Effect::Merged(report));
            effects.push(Effect::PersistQuotes);
            refresh_categories(&mut next, &mut effects);
            show_next(&mut next, &mut effects, rng);
            effects.push(Effect::Notify(MERGED_NOTICE.to_string()));
        }
    }

    Ok(Transition {
        state: next,
        effects,
    })
}

/// Rebuild the index and fall back to "all" if the filter disappeared
fn refresh_categories(state: &mut QuoteBook, effects: &mut Vec<Effect>) {
    state.filter = restore_filter(&state.quotes, &state.filter.storage_value());
    effects.push(Effect::RefreshCategories);
}

fn show_next<R: Rng + ?Sized>(state: &mut QuoteBook, effects: &mut Vec<Effect>, rng: &mut R) {
    let selection = select_quote(&state.quotes, &state.filter, rng);
    if let Selection::Quote(ref quote) = selection {
        effects.push(Effect::PersistLastQuote(quote.clone()));
    }
    state.display = Some(selection.clone());
    effects.push(Effect::Render(selection));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_quotes;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn book() -> QuoteBook {
        QuoteBook::new(default_quotes(), CategoryFilter::All)
    }

    #[test]
    fn test_add_trims_and_appends() {
        let state = book();
        let t = reduce(
            &state,
            Command::AddQuote {
                text: "  New quote ".to_string(),
                category: " Wisdom ".to_string(),
            },
            &mut rng(),
        )
        .unwrap();

        assert_eq!(t.state.quotes.len(), state.quotes.len() + 1);
        assert_eq!(t.state.quotes.last(), Some(&Quote::new("New quote", "Wisdom")));
        assert!(t.effects.contains(&Effect::PersistQuotes));
        assert!(t.effects.contains(&Effect::RefreshCategories));
    }

    #[test]
    fn test_add_rejects_blank_fields() {
        let state = book();
        for (text, category) in [("", "X"), ("text", "   "), (" \t", "\n")] {
            let err = reduce(
                &state,
                Command::AddQuote {
                    text: text.to_string(),
                    category: category.to_string(),
                },
                &mut rng(),
            )
            .unwrap_err();
            assert!(matches!(err, QuoteError::Validation));
        }
    }

    #[test]
    fn test_select_category_persists_choice_and_quote() {
        let t = reduce(
            &book(),
            Command::SelectCategory(CategoryFilter::Named("success".to_string())),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(
            t.effects[0],
            Effect::PersistSelectedCategory("success".to_string())
        );
        let quote = t.state.display.as_ref().and_then(Selection::quote).unwrap();
        assert_eq!(quote.category, "Success");
        assert!(t.effects.contains(&Effect::PersistLastQuote(quote.clone())));
    }

    #[test]
    fn test_empty_category_does_not_persist_last_quote() {
        let state = QuoteBook::new(vec![Quote::new("a", "Success")], CategoryFilter::All);
        let t = reduce(
            &state,
            Command::SelectCategory(CategoryFilter::Named("Motivation".to_string())),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(t.state.display, Some(Selection::NoQuotes));
        assert!(!t
            .effects
            .iter()
            .any(|e| matches!(e, Effect::PersistLastQuote(_))));
    }

    #[test]
    fn test_import_replaces_collection() {
        let t = reduce(
            &book(),
            Command::Import(r#"[{"text": "only", "category": "One"}]"#.to_string()),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(t.state.quotes, vec![Quote::new("only", "One")]);
        assert!(t
            .effects
            .contains(&Effect::Notify(IMPORTED_NOTICE.to_string())));
    }

    #[test]
    fn test_import_resets_vanished_filter() {
        let state = QuoteBook::new(
            default_quotes(),
            CategoryFilter::Named("Motivation".to_string()),
        );
        let t = reduce(
            &state,
            Command::Import(r#"[{"text": "only", "category": "One"}]"#.to_string()),
            &mut rng(),
        )
        .unwrap();

        assert_eq!(t.state.filter, CategoryFilter::All);
    }

    #[test]
    fn test_bad_import_is_rejected_without_change() {
        let err = reduce(&book(), Command::Import("{}".to_string()), &mut rng()).unwrap_err();
        assert!(matches!(err, QuoteError::NotAnArray));
    }

    #[test]
    fn test_export_offers_quotes_json() {
        let t = reduce(&book(), Command::Export, &mut rng()).unwrap();
        match &t.effects[..] {
            [Effect::Download {
                file_name,
                contents,
            }] => {
                assert_eq!(file_name, "quotes.json");
                assert_eq!(parse_import(contents).unwrap(), default_quotes());
            }
            other => panic!("unexpected effects: {:?}", other),
        }
        assert_eq!(t.state, book());
    }

    #[test]
    fn test_apply_remote_notifies_once() {
        let remote = vec![Quote::new("from server", "Server")];
        let first = reduce(&book(), Command::ApplyRemote(remote.clone()), &mut rng()).unwrap();

        assert!(first
            .effects
            .contains(&Effect::Notify(MERGED_NOTICE.to_string())));
        assert!(first.effects.contains(&Effect::Merged(MergeReport {
            added: 1,
            updated: 0
        })));

        let second = reduce(&first.state, Command::ApplyRemote(remote), &mut rng()).unwrap();
        assert!(second.effects.is_empty());
        assert_eq!(second.state, first.state);
    }
}
