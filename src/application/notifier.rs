//! Transient user notifications.
//!
//! Notices stack in arrival order and expire after a fixed time-to-live.
//! Uses tokio's clock so tests can pause and advance time.

use std::time::Duration;

use tokio::time::Instant;

/// A single notification.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub raised_at: Instant,
    seen: bool,
}

/// Stack of live notifications.
#[derive(Debug)]
pub struct NotificationBoard {
    ttl: Duration,
    notices: Vec<Notice>,
}

impl NotificationBoard {
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Vec::new(),
        }
    }

    /// Raise a notification. Duplicates are kept.
    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%message, "Notification");
        self.notices.push(Notice {
            message,
            raised_at: Instant::now(),
            seen: false,
        });
    }

    /// Drop expired notices.
    fn prune(&mut self) {
        let ttl = self.ttl;
        self.notices.retain(|n| n.raised_at.elapsed() < ttl);
    }

    /// Notices still within their time-to-live, newest first.
    pub fn active(&mut self) -> Vec<&Notice> {
        self.prune();
        self.notices.iter().rev().collect()
    }

    /// Live notices not yet handed out, oldest first, marking them seen.
    pub fn take_unseen(&mut self) -> Vec<String> {
        self.prune();
        self.notices
            .iter_mut()
            .filter(|n| !n.seen)
            .map(|n| {
                n.seen = true;
                n.message.clone()
            })
            .collect()
    }
}
