//! Domain models for the quote list.
//!
//! A [`Quote`] is the only entity; everything else is a view over the
//! ordered list of quotes.

use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};

/// Sentinel category value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// Category assigned to every quote mapped from the remote endpoint.
pub const SERVER_CATEGORY: &str = "Server";

/// A text/category pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    /// The quote itself.
    pub text: String,
    /// Free-form category label.
    pub category: String,
}

impl Quote {
    /// Build a quote from user input, trimming both fields.
    ///
    /// # Errors
    /// Returns a validation error if either field is empty after trimming.
    pub fn new(text: &str, category: &str) -> Result<Self> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() || category.is_empty() {
            return Err(AppError::validation(
                "Please enter both quote text and category.",
            ));
        }

        Ok(Self {
            text: text.to_string(),
            category: category.to_string(),
        })
    }

    /// Map a remote item title into a quote in the server category.
    ///
    /// Returns `None` for blank titles.
    #[must_use]
    pub fn from_server_title(title: &str) -> Option<Self> {
        if title.trim().is_empty() {
            return None;
        }

        Some(Self {
            text: title.to_string(),
            category: SERVER_CATEGORY.to_string(),
        })
    }

    /// Whether both fields are non-empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && !self.category.trim().is_empty()
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" - [{}]", self.text, self.category)
    }
}

/// The currently selected category filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Show quotes from every category.
    #[default]
    All,
    /// Show only quotes whose category equals this value.
    Named(String),
}

impl CategoryFilter {
    /// Whether a quote passes this filter.
    #[must_use]
    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Named(category) => quote.category == *category,
        }
    }

    /// The persisted string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(category) => category,
        }
    }

    /// Whether this is the "all" sentinel.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quotes used when nothing has been stored yet.
#[must_use]
pub fn seed_quotes() -> Vec<Quote> {
    [
        (
            "The only way to do great work is to love what you do.",
            "Work",
        ),
        ("Success is not in what you have, but who you are.", "Success"),
        ("Be yourself; everyone else is already taken.", "Inspiration"),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}
