//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use quotesync_core::{Effect, Quote, Selection};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print the outcome of a quote selection
    pub fn print_selection(&self, selection: &Selection) {
        match self.format {
            OutputFormat::Human => match selection {
                Selection::Quote(quote) => {
                    println!("\u{201c}{}\u{201d}", quote.text);
                    println!("    \u{2014} {}", quote.category);
                }
                Selection::NoQuotes => println!("{}", selection.display_text()),
            },
            OutputFormat::Json => match selection {
                Selection::Quote(quote) => println!("{}", to_json(quote)),
                Selection::NoQuotes => println!(
                    "{}",
                    serde_json::json!({"quote": null, "message": selection.display_text()})
                ),
            },
            OutputFormat::Quiet => {
                if let Selection::Quote(quote) = selection {
                    println!("{}", quote.text);
                }
            }
        }
    }

    /// Print a list of quotes
    pub fn print_quotes(&self, quotes: &[&Quote]) {
        match self.format {
            OutputFormat::Human => {
                if quotes.is_empty() {
                    println!("No quotes found.");
                    return;
                }
                for (i, quote) in quotes.iter().enumerate() {
                    println!(
                        "{:>3} | {} | {}",
                        i + 1,
                        truncate(&quote.category, 15),
                        truncate(&quote.text, 70)
                    );
                }
                println!("\n{} quote(s)", quotes.len());
            }
            OutputFormat::Json => println!("{}", to_json(&quotes)),
            OutputFormat::Quiet => {
                for quote in quotes {
                    println!("{}", quote.text);
                }
            }
        }
    }

    /// Print categories with counts
    pub fn print_categories(&self, categories: &[(String, usize)]) {
        match self.format {
            OutputFormat::Human => {
                if categories.is_empty() {
                    println!("No categories found.");
                    return;
                }
                for (name, count) in categories {
                    println!("{} ({})", name, count);
                }
                println!("\n{} categor{}", categories.len(), plural_y(categories.len()));
            }
            OutputFormat::Json => {
                let json: Vec<_> = categories
                    .iter()
                    .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
                    .collect();
                println!("{}", to_json(&json));
            }
            OutputFormat::Quiet => {
                for (name, _) in categories {
                    println!("{}", name);
                }
            }
        }
    }

    /// Report the user-facing effects of a command
    ///
    /// Notifications become success lines; renders are printed as quotes.
    pub fn print_effects(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::Notify(msg) => self.success(msg),
                Effect::Render(selection) => self.print_selection(selection),
                _ => {}
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("\u{2713} {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
