//! Remote sync agent.
//!
//! Periodically fetches a page of remote titles and merges the ones whose
//! text is not already present. A tick is either idle or fetching; a second
//! tick cannot start while one is in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::{AppError, Result, SyncConfig, SyncOutcome, SyncPhase};
use crate::infrastructure::RemoteSource;

use super::session::QuoteSession;

/// Session shared between the foreground and the sync task.
pub type SharedSession = Arc<Mutex<QuoteSession>>;

/// Fetches remote quotes and merges them into a session.
pub struct SyncAgent<S> {
    source: S,
    session: SharedSession,
    page_size: usize,
    interval: Duration,
    phase: watch::Sender<SyncPhase>,
}

impl<S: RemoteSource> SyncAgent<S> {
    /// Create an idle agent.
    #[must_use]
    pub fn new(source: S, session: SharedSession, config: &SyncConfig) -> Self {
        let (phase, _) = watch::channel(SyncPhase::Idle);

        Self {
            source,
            session,
            page_size: config.page_size,
            interval: config.interval(),
            phase,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        *self.phase.borrow()
    }

    /// Run one sync tick.
    ///
    /// Fetch and parse failures are logged, recorded in the sync status and
    /// returned as [`SyncOutcome::Failed`]; the session is left untouched.
    ///
    /// # Errors
    /// Returns `SyncBusy` if a tick is already fetching, or a storage error
    /// if merged quotes cannot be persisted.
    pub async fn tick(&self) -> Result<SyncOutcome> {
        let started = self.phase.send_if_modified(|phase| {
            if *phase == SyncPhase::Idle {
                *phase = SyncPhase::Fetching;
                true
            } else {
                false
            }
        });

        if !started {
            return Err(AppError::SyncBusy);
        }
        let _idle_on_exit = IdleOnDrop(&self.phase);

        let fetched = self.source.fetch_titles(self.page_size).await;

        let merged = {
            let mut session = self.session.lock().await;
            let outcome = match fetched {
                Ok(titles) => session.merge_server_titles(&titles),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to sync with server");
                    Ok(SyncOutcome::Failed {
                        error: e.to_string(),
                    })
                }
            };

            outcome.and_then(|outcome| {
                session.record_sync(outcome.clone())?;
                Ok(outcome)
            })
        };

        if let Ok(outcome) = &merged {
            tracing::info!(%outcome, "Sync tick finished");
        }

        merged
    }
}

impl<S: RemoteSource + 'static> SyncAgent<S> {
    /// Spawn the periodic loop: one tick now, then one per interval.
    ///
    /// The agent stays usable for manual ticks while the loop runs.
    #[must_use]
    pub fn start(self: &Arc<Self>) -> SyncHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let agent = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(agent.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                interval_secs = agent.interval.as_secs(),
                "Sync agent started"
            );

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if let Err(e) = agent.tick().await {
                            tracing::warn!(error = %e, "Sync tick failed");
                        }
                    }
                }
            }

            tracing::info!("Sync agent stopped");
        });

        SyncHandle {
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Returns the agent to idle when a tick finishes or is dropped mid-fetch.
struct IdleOnDrop<'a>(&'a watch::Sender<SyncPhase>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(SyncPhase::Idle);
    }
}

/// Handle to a running sync loop.
pub struct SyncHandle {
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Stop the loop and wait for it to exit.
    ///
    /// An in-flight tick is allowed to finish first.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }

        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Sync task ended abnormally");
        }
    }
}
