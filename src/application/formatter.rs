//! Output formatting for quotes and status.
//!
//! Supports multiple output formats: plain text, JSON, and table view.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{CategoryFilter, Quote, SyncOutcome, SyncStatus, ALL_CATEGORIES};

use super::display::Rendered;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One quote per line.
    #[default]
    Text,
    /// JSON format for programmatic use.
    Json,
    /// Numbered table listing.
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            _ => Err(format!("Unknown format: {s}. Use: text, json, table")),
        }
    }
}

/// Formats the quote display line.
pub fn format_rendered(rendered: &Rendered) -> String {
    match rendered {
        Rendered::Quote(quote) => format!(
            "\"{}\" - [{}]",
            quote.text.bold(),
            quote.category.cyan()
        ),
        Rendered::Empty(message) => message.dimmed().to_string(),
    }
}

/// Formats quotes in the requested format.
///
/// # Errors
/// Returns error if JSON serialization fails.
pub fn format_quotes(quotes: &[Quote], format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format_quotes_text(quotes)),
        OutputFormat::Json => serde_json::to_string_pretty(quotes),
        OutputFormat::Table => Ok(format_quotes_table(quotes)),
    }
}

fn format_quotes_text(quotes: &[Quote]) -> String {
    quotes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a table listing of quotes.
pub fn format_quotes_table(quotes: &[Quote]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Category", "Quote"]);

    for (i, quote) in quotes.iter().enumerate() {
        table.add_row(vec![
            &(i + 1).to_string(),
            &quote.category,
            &truncate(&quote.text, 60),
        ]);
    }

    table.to_string()
}

/// Formats the category selector: "all" first, then each category,
/// with the current selection marked.
pub fn format_categories<'a>(
    categories: impl Iterator<Item = &'a str>,
    selected: &CategoryFilter,
) -> String {
    std::iter::once(ALL_CATEGORIES)
        .chain(categories)
        .map(|category| {
            if category == selected.as_str() {
                format!("{} {}", "*".green().bold(), category.green())
            } else {
                format!("  {category}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats the persisted sync status for display.
pub fn format_sync_status(status: &SyncStatus) -> String {
    let last_sync = status.last_sync.map_or_else(
        || "never".to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    );

    let outcome = match &status.last_outcome {
        None => "-".normal(),
        Some(o @ SyncOutcome::Failed { .. }) => o.to_string().red(),
        Some(o) => o.to_string().green(),
    };

    let mut out = format!(
        "{}\n  Last sync: {}\n  Outcome: {}\n  Quotes added by sync: {}",
        "🔄 Sync status".bold(),
        last_sync.cyan(),
        outcome,
        status.total_added.to_string().yellow()
    );

    if let Some(error) = status.last_error() {
        out.push_str(&format!("\n  Last error: {}", error.red()));
    }

    out
}

/// Formats a notification banner.
pub fn format_banner(message: &str) -> String {
    format!("{} {}", "▌".yellow(), message.on_bright_yellow().black())
}

/// Truncates a string to max length (in characters) with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
