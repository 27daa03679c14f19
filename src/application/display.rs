//! Random quote selection and rendering.

use rand::Rng;

use crate::domain::Quote;

/// Shown when the unfiltered pool is empty.
pub const NO_QUOTES: &str = "No quotes available.";
/// Shown when a category filter matches nothing.
pub const NO_QUOTES_FOR_CATEGORY: &str = "No quotes available for this category.";

/// What the quote display currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// A selected quote.
    Quote(Quote),
    /// The empty-state message.
    Empty(&'static str),
}

impl Rendered {
    /// The selected quote, if any.
    #[must_use]
    pub const fn quote(&self) -> Option<&Quote> {
        match self {
            Self::Quote(quote) => Some(quote),
            Self::Empty(_) => None,
        }
    }
}

impl std::fmt::Display for Rendered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quote(quote) => quote.fmt(f),
            Self::Empty(message) => f.write_str(message),
        }
    }
}

/// Picks one quote uniformly at random from a pool.
pub struct DisplayController<R> {
    rng: R,
}

impl<R: Rng> DisplayController<R> {
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Select from `pool`, or render `empty_message` when it is empty.
    pub fn show_random(&mut self, pool: &[&Quote], empty_message: &'static str) -> Rendered {
        if pool.is_empty() {
            return Rendered::Empty(empty_message);
        }

        let index = self.rng.gen_range(0..pool.len());
        Rendered::Quote(pool[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_empty_pool_renders_message() {
        let mut display = DisplayController::new(StdRng::seed_from_u64(1));
        let rendered = display.show_random(&[], NO_QUOTES);

        assert_eq!(rendered, Rendered::Empty(NO_QUOTES));
        assert_eq!(rendered.to_string(), "No quotes available.");
        assert!(rendered.quote().is_none());
    }

    #[test]
    fn test_selection_stays_in_pool() {
        let quotes = [
            Quote::new("A", "Work").unwrap(),
            Quote::new("B", "Work").unwrap(),
            Quote::new("C", "Life").unwrap(),
        ];
        let pool: Vec<&Quote> = quotes.iter().collect();
        let mut display = DisplayController::new(StdRng::seed_from_u64(7));

        for _ in 0..100 {
            let rendered = display.show_random(&pool, NO_QUOTES);
            let picked = rendered.quote().unwrap();
            assert!(quotes.contains(picked));
        }
    }

    #[test]
    fn test_every_quote_can_be_selected() {
        let quotes = [
            Quote::new("A", "Work").unwrap(),
            Quote::new("B", "Work").unwrap(),
        ];
        let pool: Vec<&Quote> = quotes.iter().collect();
        let mut display = DisplayController::new(StdRng::seed_from_u64(42));

        let picked: std::collections::HashSet<String> = (0..200)
            .filter_map(|_| display.show_random(&pool, NO_QUOTES).quote().cloned())
            .map(|q| q.text)
            .collect();

        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_rendered_format() {
        let rendered = Rendered::Quote(Quote::new("A", "Work").unwrap());
        assert_eq!(rendered.to_string(), "\"A\" - [Work]");
    }
}
