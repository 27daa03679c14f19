//! In-memory quote repository and category index.

use std::collections::HashSet;

use crate::domain::{CategoryFilter, Quote, Result};

/// Ordered list of quotes for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteRepository {
    quotes: Vec<Quote>,
}

impl QuoteRepository {
    /// Wrap an existing list, preserving order.
    #[must_use]
    pub const fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Quote] {
        &self.quotes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Drop every quote past the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.quotes.truncate(len);
    }

    /// Validate and append a user-entered quote.
    ///
    /// # Errors
    /// Returns a validation error, leaving the list untouched, if either
    /// field is blank.
    pub fn add_quote(&mut self, text: &str, category: &str) -> Result<&Quote> {
        let quote = Quote::new(text, category)?;
        self.quotes.push(quote);
        Ok(&self.quotes[self.quotes.len() - 1])
    }

    /// Append quotes as-is.
    pub fn extend(&mut self, quotes: impl IntoIterator<Item = Quote>) {
        self.quotes.extend(quotes);
    }

    /// Whether any quote has exactly this text, regardless of category.
    #[must_use]
    pub fn contains_text(&self, text: &str) -> bool {
        self.quotes.iter().any(|q| q.text == text)
    }

    /// Append incoming quotes whose text is not already present.
    ///
    /// Matching is by text only, so a server copy of a local quote is
    /// dropped even when categories differ. Returns the number added.
    pub fn merge_new(&mut self, incoming: impl IntoIterator<Item = Quote>) -> usize {
        let mut fresh: Vec<Quote> = Vec::new();

        for quote in incoming {
            if !self.contains_text(&quote.text) && !fresh.iter().any(|q| q.text == quote.text) {
                fresh.push(quote);
            }
        }

        let added = fresh.len();
        self.quotes.append(&mut fresh);
        added
    }

    /// Quotes passing the filter, in insertion order.
    pub fn filtered<'a>(&'a self, filter: &'a CategoryFilter) -> impl Iterator<Item = &'a Quote> {
        self.quotes.iter().filter(move |q| filter.matches(q))
    }

    /// Distinct categories in first-seen order.
    ///
    /// Computed lazily on each call; nothing is cached.
    #[must_use]
    pub fn categories(&self) -> Categories<'_> {
        Categories {
            quotes: self.quotes.iter(),
            seen: HashSet::new(),
        }
    }
}

/// Iterator over distinct categories, see [`QuoteRepository::categories`].
pub struct Categories<'a> {
    quotes: std::slice::Iter<'a, Quote>,
    seen: HashSet<&'a str>,
}

impl<'a> Iterator for Categories<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.quotes
            .by_ref()
            .map(|q| q.category.as_str())
            .find(|category| self.seen.insert(*category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SERVER_CATEGORY;

    fn quote(text: &str, category: &str) -> Quote {
        Quote::new(text, category).unwrap()
    }

    #[test]
    fn test_add_quote_appends_one() {
        let mut repo = QuoteRepository::default();
        let added = repo.add_quote(" Keep going ", "Life").unwrap().clone();

        assert_eq!(repo.len(), 1);
        assert_eq!(added, quote("Keep going", "Life"));
    }

    #[test]
    fn test_add_quote_blank_fields_do_not_mutate() {
        let mut repo = QuoteRepository::new(vec![quote("A", "Work")]);
        let before = repo.clone();

        assert!(repo.add_quote("", "X").is_err());
        assert!(repo.add_quote("X", "").is_err());
        assert!(repo.add_quote("  ", "  ").is_err());
        assert_eq!(repo, before);
    }

    #[test]
    fn test_categories_distinct_in_insertion_order() {
        let repo = QuoteRepository::new(vec![
            quote("1", "Work"),
            quote("2", "Life"),
            quote("3", "Work"),
            quote("4", "Humor"),
            quote("5", "Life"),
        ]);

        let categories: Vec<_> = repo.categories().collect();
        assert_eq!(categories, vec!["Work", "Life", "Humor"]);

        // Recomputed on each call
        assert_eq!(repo.categories().count(), 3);
    }

    #[test]
    fn test_filtered_matches_category_only() {
        let repo = QuoteRepository::new(vec![quote("1", "Work"), quote("2", "Life")]);
        let work = CategoryFilter::Named("Work".into());

        let texts: Vec<_> = repo.filtered(&work).map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["1"]);
        assert_eq!(repo.filtered(&CategoryFilter::All).count(), 2);
        assert_eq!(
            repo.filtered(&CategoryFilter::Named("None".into())).count(),
            0
        );
    }

    #[test]
    fn test_merge_new_keeps_local_copy() {
        let mut repo = QuoteRepository::new(vec![quote("A", "Work")]);
        let incoming = ["A", "B"]
            .iter()
            .filter_map(|t| Quote::from_server_title(t));

        let added = repo.merge_new(incoming);

        assert_eq!(added, 1);
        assert_eq!(
            repo.as_slice(),
            &[quote("A", "Work"), quote("B", SERVER_CATEGORY)]
        );
    }

    #[test]
    fn test_merge_new_is_idempotent() {
        let page: Vec<Quote> = ["a", "b", "c", "d", "e"]
            .iter()
            .filter_map(|t| Quote::from_server_title(t))
            .collect();
        let mut repo = QuoteRepository::default();

        assert_eq!(repo.merge_new(page.clone()), 5);
        assert_eq!(repo.merge_new(page), 0);
        assert_eq!(repo.len(), 5);
    }

    #[test]
    fn test_truncate_restores_earlier_length() {
        let mut repo = QuoteRepository::new(vec![quote("A", "Work")]);
        let before = repo.clone();
        repo.merge_new(vec![quote("B", SERVER_CATEGORY), quote("C", SERVER_CATEGORY)]);

        repo.truncate(before.len());

        assert_eq!(repo, before);
    }

    #[test]
    fn test_merge_new_dedupes_within_batch() {
        let mut repo = QuoteRepository::default();
        let page = vec![
            quote("same", SERVER_CATEGORY),
            quote("same", SERVER_CATEGORY),
        ];

        assert_eq!(repo.merge_new(page), 1);
    }
}
