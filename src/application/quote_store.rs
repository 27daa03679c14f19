//! Persistent store for quotes and view state.
//!
//! Maps the domain values onto fixed keys in a durable store and a
//! session-scoped store.

use crate::domain::{AppError, CategoryFilter, Quote, Result, SyncStatus};
use crate::infrastructure::KeyValueStore;

/// Durable key holding the JSON array of quotes.
pub const QUOTES_KEY: &str = "quotes";
/// Durable key holding the selected category as a plain string.
pub const SELECTED_CATEGORY_KEY: &str = "selectedCategory";
/// Session key holding the last displayed quote as JSON.
pub const LAST_VIEWED_KEY: &str = "lastViewedQuote";
/// Durable key holding the last sync status as JSON.
pub const SYNC_STATUS_KEY: &str = "syncStatus";

/// Boxed store that can move between tasks.
pub type BoxedStore = Box<dyn KeyValueStore + Send>;

/// Reads and writes quote state under fixed keys.
pub struct QuoteStore {
    durable: BoxedStore,
    session: BoxedStore,
}

impl QuoteStore {
    /// Combine a durable and a session store.
    #[must_use]
    pub fn new(durable: BoxedStore, session: BoxedStore) -> Self {
        Self { durable, session }
    }

    /// Load the stored quote list.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    ///
    /// # Errors
    /// Returns `CorruptState` if the stored value is not a valid quote array.
    pub fn load(&self) -> Result<Option<Vec<Quote>>> {
        let Some(raw) = self.durable.get(QUOTES_KEY)? else {
            return Ok(None);
        };

        let quotes: Vec<Quote> =
            serde_json::from_str(&raw).map_err(|e| AppError::CorruptState {
                key: QUOTES_KEY.into(),
                message: e.to_string(),
            })?;

        Ok(Some(quotes))
    }

    /// Persist the full quote list.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save(&mut self, quotes: &[Quote]) -> Result<()> {
        let json = serde_json::to_string(quotes).map_err(AppError::serialization)?;
        self.durable.set(QUOTES_KEY, &json)?;
        tracing::debug!(count = quotes.len(), "Saved quotes");
        Ok(())
    }

    /// Load the persisted category selection.
    ///
    /// # Errors
    /// Returns error if the read fails.
    pub fn load_selected_category(&self) -> Result<Option<CategoryFilter>> {
        Ok(self
            .durable
            .get(SELECTED_CATEGORY_KEY)?
            .map(|value| CategoryFilter::from(value.as_str())))
    }

    /// Persist the category selection.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn save_selected_category(&mut self, filter: &CategoryFilter) -> Result<()> {
        self.durable.set(SELECTED_CATEGORY_KEY, filter.as_str())
    }

    /// Remember the most recently displayed quote for this session.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save_last_viewed(&mut self, quote: &Quote) -> Result<()> {
        let json = serde_json::to_string(quote).map_err(AppError::serialization)?;
        self.session.set(LAST_VIEWED_KEY, &json)
    }

    /// The most recently displayed quote in this session.
    ///
    /// # Errors
    /// Returns `CorruptState` if the session value cannot be decoded.
    pub fn load_last_viewed(&self) -> Result<Option<Quote>> {
        self.session
            .get(LAST_VIEWED_KEY)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| AppError::CorruptState {
                    key: LAST_VIEWED_KEY.into(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Load the last sync status, treating a corrupt record as empty.
    ///
    /// # Errors
    /// Returns error if the read fails.
    pub fn load_sync_status(&self) -> Result<SyncStatus> {
        let Some(raw) = self.durable.get(SYNC_STATUS_KEY)? else {
            return Ok(SyncStatus::default());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring corrupt sync status");
            SyncStatus::default()
        }))
    }

    /// Persist the sync status.
    ///
    /// # Errors
    /// Returns error if serialization or the write fails.
    pub fn save_sync_status(&mut self, status: &SyncStatus) -> Result<()> {
        let json = serde_json::to_string(status).map_err(AppError::serialization)?;
        self.durable.set(SYNC_STATUS_KEY, &json)
    }
}
