//! Quote session - the single owner of the repository during a run.
//!
//! Every mutation goes through here so that persistence and view refresh
//! happen explicitly after each change.

use std::time::Duration;

use rand::rngs::StdRng;

use crate::domain::{
    seed_quotes, AppError, CategoryFilter, Quote, Result, SyncOutcome, SyncStatus,
};

use super::display::{DisplayController, Rendered, NO_QUOTES, NO_QUOTES_FOR_CATEGORY};
use super::notifier::NotificationBoard;
use super::quote_store::QuoteStore;
use super::repository::{Categories, QuoteRepository};
use super::transfer;

/// Notification raised after a sync tick added quotes.
pub const SYNC_NOTICE: &str =
    "Quotes synced with server. Conflicts resolved using server-first strategy.";

/// One running session over the stored quotes.
pub struct QuoteSession {
    repo: QuoteRepository,
    store: QuoteStore,
    display: DisplayController<StdRng>,
    notices: NotificationBoard,
    selected: CategoryFilter,
    current: Option<Rendered>,
    pending_view: Option<Rendered>,
}

impl QuoteSession {
    /// Load stored state, seeding defaults when nothing usable is stored.
    ///
    /// # Errors
    /// Returns error if storage cannot be read or the seed cannot be saved.
    pub fn bootstrap(store: QuoteStore, rng: StdRng, notice_ttl: Duration) -> Result<Self> {
        let stored = match store.load() {
            Ok(stored) => stored,
            Err(AppError::CorruptState { key, message }) => {
                tracing::warn!(%key, %message, "Stored quotes are corrupt; using defaults");
                None
            }
            Err(e) => return Err(e),
        };

        let selected = store.load_selected_category()?.unwrap_or_default();

        let mut session = Self {
            repo: QuoteRepository::default(),
            store,
            display: DisplayController::new(rng),
            notices: NotificationBoard::new(notice_ttl),
            selected,
            current: None,
            pending_view: None,
        };

        match stored {
            Some(quotes) => session.repo = QuoteRepository::new(quotes),
            None => {
                session.repo = QuoteRepository::new(seed_quotes());
                session.persist()?;
                tracing::info!("Seeded default quotes");
            }
        }

        tracing::debug!(
            quotes = session.repo.len(),
            selected = %session.selected,
            "Session ready"
        );

        Ok(session)
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(self.repo.as_slice())
    }

    /// Persist quotes appended since the repository held `committed` items,
    /// dropping them again if the write fails.
    fn persist_appended(&mut self, committed: usize) -> Result<()> {
        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "Save failed; discarding unsaved quotes");
            self.repo.truncate(committed);
            return Err(e);
        }
        Ok(())
    }

    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        self.repo.as_slice()
    }

    #[must_use]
    pub const fn selected(&self) -> &CategoryFilter {
        &self.selected
    }

    /// Distinct categories currently present.
    #[must_use]
    pub fn categories(&self) -> Categories<'_> {
        self.repo.categories()
    }

    /// What the display last rendered.
    #[must_use]
    pub const fn current(&self) -> Option<&Rendered> {
        self.current.as_ref()
    }

    fn record_view(&mut self, rendered: Rendered) -> Result<Rendered> {
        if let Some(quote) = rendered.quote() {
            self.store.save_last_viewed(quote)?;
        }
        self.current = Some(rendered.clone());
        Ok(rendered)
    }

    /// Show a random quote from the whole repository.
    ///
    /// # Errors
    /// Returns error if the last-viewed quote cannot be recorded.
    pub fn show_random(&mut self) -> Result<Rendered> {
        let pool: Vec<&Quote> = self.repo.as_slice().iter().collect();
        let rendered = self.display.show_random(&pool, NO_QUOTES);
        self.record_view(rendered)
    }

    /// Select a category, persist it, and show a random quote from it.
    ///
    /// # Errors
    /// Returns error if the selection or last-viewed quote cannot be stored.
    pub fn filter_and_show(&mut self, filter: CategoryFilter) -> Result<Rendered> {
        self.store.save_selected_category(&filter)?;
        self.selected = filter;

        let empty_message = if self.selected.is_all() {
            NO_QUOTES
        } else {
            NO_QUOTES_FOR_CATEGORY
        };
        let pool: Vec<&Quote> = self.repo.filtered(&self.selected).collect();
        let rendered = self.display.show_random(&pool, empty_message);
        self.record_view(rendered)
    }

    /// Re-run the current filter.
    ///
    /// # Errors
    /// See [`Self::filter_and_show`].
    pub fn refresh_view(&mut self) -> Result<Rendered> {
        self.filter_and_show(self.selected.clone())
    }

    /// Add a user-entered quote and persist.
    ///
    /// # Errors
    /// Returns a validation error for blank fields, or a storage error.
    pub fn add_quote(&mut self, text: &str, category: &str) -> Result<Quote> {
        let committed = self.repo.len();
        let quote = self.repo.add_quote(text, category)?.clone();
        self.persist_appended(committed)?;
        tracing::info!(category = %quote.category, "Added quote");
        Ok(quote)
    }

    /// Export the repository as pretty JSON.
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn export_json(&self) -> Result<String> {
        transfer::export_json(self.repo.as_slice())
    }

    /// Append imported quotes, persist, and refresh the view.
    ///
    /// # Errors
    /// Returns error if persistence or the view refresh fails.
    pub fn import_quotes(&mut self, quotes: Vec<Quote>) -> Result<Rendered> {
        let count = quotes.len();
        let committed = self.repo.len();
        self.repo.extend(quotes);
        self.persist_appended(committed)?;
        tracing::info!(count, "Imported quotes");
        self.refresh_view()
    }

    /// Merge titles fetched from the server.
    ///
    /// Titles whose text already exists locally are dropped. When anything
    /// was added the repository is persisted, the view refreshed, and a
    /// notification raised.
    ///
    /// # Errors
    /// Returns error if persistence or the view refresh fails.
    pub fn merge_server_titles(&mut self, titles: &[String]) -> Result<SyncOutcome> {
        let committed = self.repo.len();
        let incoming = titles.iter().filter_map(|t| Quote::from_server_title(t));
        let added = self.repo.merge_new(incoming);

        if added == 0 {
            return Ok(SyncOutcome::UpToDate);
        }

        self.persist_appended(committed)?;
        let view = self.refresh_view()?;
        self.pending_view = Some(view);
        self.notices.notify(SYNC_NOTICE);

        Ok(SyncOutcome::Merged { added })
    }

    /// View refreshed in the background since the last call.
    pub fn take_pending_view(&mut self) -> Option<Rendered> {
        self.pending_view.take()
    }

    pub fn notices(&mut self) -> &mut NotificationBoard {
        &mut self.notices
    }

    /// The last quote displayed in this session.
    ///
    /// # Errors
    /// Returns error if the session value is unreadable.
    pub fn last_viewed(&self) -> Result<Option<Quote>> {
        self.store.load_last_viewed()
    }

    /// Persisted summary of the last sync tick.
    ///
    /// # Errors
    /// Returns error if storage cannot be read.
    pub fn sync_status(&self) -> Result<SyncStatus> {
        self.store.load_sync_status()
    }

    /// Record a finished sync tick.
    ///
    /// # Errors
    /// Returns error if storage cannot be written.
    pub fn record_sync(&mut self, outcome: SyncOutcome) -> Result<SyncStatus> {
        let status = self.store.load_sync_status()?.record(outcome);
        self.store.save_sync_status(&status)?;
        Ok(status)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::quote_store::QUOTES_KEY;
    use crate::domain::SERVER_CATEGORY;
    use crate::infrastructure::{KeyValueStore, LocalStorage, SessionStorage};
    use rand::SeedableRng;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    pub(crate) fn session_with(quotes: &[(&str, &str)]) -> QuoteSession {
        let mut durable = LocalStorage::open_in_memory().unwrap();
        let list: Vec<Quote> = quotes
            .iter()
            .map(|(t, c)| Quote::new(t, c).unwrap())
            .collect();
        durable
            .set(QUOTES_KEY, &serde_json::to_string(&list).unwrap())
            .unwrap();
        let store = QuoteStore::new(Box::new(durable), Box::new(SessionStorage::new()));
        QuoteSession::bootstrap(store, StdRng::seed_from_u64(3), Duration::from_secs(5)).unwrap()
    }

    fn open_on_disk(path: &Path) -> QuoteSession {
        let store = QuoteStore::new(
            Box::new(LocalStorage::open(path).unwrap()),
            Box::new(SessionStorage::new()),
        );
        QuoteSession::bootstrap(store, StdRng::seed_from_u64(3), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_bootstrap_seeds_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotes.db");

        let session = open_on_disk(&path);
        assert_eq!(session.quotes(), seed_quotes().as_slice());
        assert!(session.selected().is_all());

        let storage = LocalStorage::open(&path).unwrap();
        assert!(storage.get(QUOTES_KEY).unwrap().is_some());
    }

    #[test]
    fn test_bootstrap_recovers_from_corrupt_state() {
        let mut durable = LocalStorage::open_in_memory().unwrap();
        durable.set(QUOTES_KEY, "not json").unwrap();
        let store = QuoteStore::new(Box::new(durable), Box::new(SessionStorage::new()));

        let session =
            QuoteSession::bootstrap(store, StdRng::seed_from_u64(1), Duration::from_secs(5))
                .unwrap();

        assert_eq!(session.quotes(), seed_quotes().as_slice());
    }

    #[test]
    fn test_add_quote_roundtrips_through_storage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotes.db");

        {
            let mut session = open_on_disk(&path);
            session.add_quote("Stay curious.", "Life").unwrap();
            assert_eq!(session.quotes().len(), 4);
        }

        let session = open_on_disk(&path);
        assert_eq!(session.quotes().len(), 4);
        assert_eq!(
            session.quotes().last(),
            Some(&Quote::new("Stay curious.", "Life").unwrap())
        );
    }

    #[test]
    fn test_add_quote_rejects_blank() {
        let mut session = session_with(&[("A", "Work")]);
        assert!(session.add_quote("", "X").is_err());
        assert!(session.add_quote("X", "").is_err());
        assert_eq!(session.quotes().len(), 1);
    }

    #[test]
    fn test_filter_and_show_only_selects_matching() {
        let mut session = session_with(&[("A", "Work"), ("B", "Life"), ("C", "Work")]);

        for _ in 0..50 {
            let rendered = session
                .filter_and_show(CategoryFilter::Named("Work".into()))
                .unwrap();
            assert_eq!(rendered.quote().unwrap().category, "Work");
        }
    }

    #[test]
    fn test_filter_and_show_empty_category() {
        let mut session = session_with(&[("A", "Work")]);
        let rendered = session
            .filter_and_show(CategoryFilter::Named("Missing".into()))
            .unwrap();

        assert_eq!(rendered, Rendered::Empty(NO_QUOTES_FOR_CATEGORY));
        assert_eq!(session.selected().as_str(), "Missing");
    }

    #[test]
    fn test_selection_persists_across_sessions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotes.db");

        {
            let mut session = open_on_disk(&path);
            session
                .filter_and_show(CategoryFilter::Named("Work".into()))
                .unwrap();
        }

        let session = open_on_disk(&path);
        assert_eq!(session.selected(), &CategoryFilter::Named("Work".into()));
    }

    #[test]
    fn test_show_random_records_last_viewed() {
        let mut session = session_with(&[("A", "Work")]);
        assert!(session.last_viewed().unwrap().is_none());

        let rendered = session.show_random().unwrap();

        assert_eq!(session.last_viewed().unwrap().as_ref(), rendered.quote());
        assert_eq!(session.current(), Some(&rendered));
    }

    #[test]
    fn test_show_random_empty_repository() {
        let mut session = session_with(&[]);
        assert_eq!(session.show_random().unwrap(), Rendered::Empty(NO_QUOTES));
    }

    #[test]
    fn test_filter_all_on_empty_repository_uses_general_message() {
        let mut session = session_with(&[]);
        assert_eq!(
            session.filter_and_show(CategoryFilter::All).unwrap(),
            Rendered::Empty(NO_QUOTES)
        );
    }

    #[test]
    fn test_merge_scenario_keeps_local_category() {
        let mut session = session_with(&[("A", "Work")]);

        let outcome = session
            .merge_server_titles(&["A".to_string(), "B".to_string()])
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Merged { added: 1 });
        assert_eq!(
            session.quotes(),
            &[
                Quote::new("A", "Work").unwrap(),
                Quote::new("B", SERVER_CATEGORY).unwrap()
            ]
        );
        assert!(session.take_pending_view().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_notifies_only_when_added() {
        let mut session = session_with(&[("A", "Work")]);
        let titles = vec!["B".to_string()];

        session.merge_server_titles(&titles).unwrap();
        assert_eq!(session.notices().take_unseen(), vec![SYNC_NOTICE]);

        let outcome = session.merge_server_titles(&titles).unwrap();
        assert_eq!(outcome, SyncOutcome::UpToDate);
        assert!(session.notices().take_unseen().is_empty());
        assert!(session.take_pending_view().is_some());
        assert!(session.take_pending_view().is_none());
    }

    #[test]
    fn test_export_import_roundtrip_into_empty() {
        let source = session_with(&[("A", "Work"), ("B", "Life")]);
        let json = source.export_json().unwrap();

        let mut target = session_with(&[]);
        target
            .import_quotes(transfer::parse_import(&json).unwrap())
            .unwrap();

        assert_eq!(target.quotes(), source.quotes());
    }

    async fn import_file(session: &mut QuoteSession, path: &Path) -> Result<Rendered> {
        let quotes = transfer::read_import(path).await?;
        session.import_quotes(quotes)
    }

    #[tokio::test]
    async fn test_rejected_import_file_leaves_stored_quotes_unchanged() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("quotes.db");
        let mut session = open_on_disk(&db_path);
        let stored = || LocalStorage::open(&db_path).unwrap().get(QUOTES_KEY).unwrap();
        let before = stored();

        let cases = [
            ("object.json", r#"{"text": "B", "category": "Work"}"#, "Invalid JSON format."),
            ("broken.json", r#"[{"text": "B","#, "Error parsing JSON file."),
        ];

        for (name, contents, message) in cases {
            let path = dir.path().join(name);
            std::fs::write(&path, contents).unwrap();

            let err = import_file(&mut session, &path).await.unwrap_err();

            assert_eq!(err.to_string(), message);
            assert_eq!(stored(), before);
            assert_eq!(session.quotes(), seed_quotes().as_slice());
        }
    }

    /// Durable store whose writes can be switched off.
    struct FlakyStore {
        inner: LocalStorage,
        fail_writes: Arc<AtomicBool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::Io {
                    message: "disk full".into(),
                    source: None,
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    fn flaky_on_disk(path: &Path) -> (QuoteSession, Arc<AtomicBool>) {
        let fail_writes = Arc::new(AtomicBool::new(false));
        let durable = FlakyStore {
            inner: LocalStorage::open(path).unwrap(),
            fail_writes: Arc::clone(&fail_writes),
        };
        let store = QuoteStore::new(Box::new(durable), Box::new(SessionStorage::new()));
        let session =
            QuoteSession::bootstrap(store, StdRng::seed_from_u64(3), Duration::from_secs(5))
                .unwrap();
        (session, fail_writes)
    }

    fn stored_count(path: &Path) -> usize {
        let raw = LocalStorage::open(path).unwrap().get(QUOTES_KEY).unwrap().unwrap();
        serde_json::from_str::<Vec<Quote>>(&raw).unwrap().len()
    }

    #[test]
    fn test_failed_save_discards_added_and_imported_quotes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotes.db");
        let (mut session, fail_writes) = flaky_on_disk(&path);
        fail_writes.store(true, Ordering::SeqCst);

        assert!(session.add_quote("Stay curious.", "Life").is_err());
        assert_eq!(session.quotes(), seed_quotes().as_slice());

        let imported = vec![Quote::new("B", "Work").unwrap()];
        assert!(session.import_quotes(imported).is_err());
        assert_eq!(session.quotes(), seed_quotes().as_slice());
        assert_eq!(stored_count(&path), 3);
    }

    #[test]
    fn test_failed_merge_is_retried_after_writes_recover() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("quotes.db");
        let (mut session, fail_writes) = flaky_on_disk(&path);
        let titles = vec!["B".to_string()];

        fail_writes.store(true, Ordering::SeqCst);
        assert!(session.merge_server_titles(&titles).is_err());
        assert_eq!(session.quotes().len(), 3);
        assert!(session.take_pending_view().is_none());
        assert!(session.notices().take_unseen().is_empty());

        fail_writes.store(false, Ordering::SeqCst);
        let outcome = session.merge_server_titles(&titles).unwrap();

        assert_eq!(outcome, SyncOutcome::Merged { added: 1 });
        assert_eq!(stored_count(&path), 4);
        assert_eq!(session.notices().take_unseen(), vec![SYNC_NOTICE]);
    }

    #[test]
    fn test_record_sync_accumulates() {
        let mut session = session_with(&[]);
        session.record_sync(SyncOutcome::Merged { added: 2 }).unwrap();
        let status = session.record_sync(SyncOutcome::UpToDate).unwrap();

        assert_eq!(status.total_added, 2);
        assert_eq!(session.sync_status().unwrap().total_added, 2);
    }
}
