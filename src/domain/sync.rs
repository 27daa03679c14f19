//! Sync-related domain models and configuration.
//!
//! Contains the application configuration, the sync agent's two-state
//! phase, and the status record persisted after each tick.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default remote endpoint polled by the sync agent.
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

/// Configuration for the remote sync agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Whether the shell starts the sync agent.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Interval between sync ticks in seconds.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Number of remote items consumed per tick.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Remote endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval(),
            page_size: default_page_size(),
            timeout_secs: default_timeout(),
            endpoint: default_endpoint(),
        }
    }
}

impl SyncConfig {
    /// Tick interval as a duration, never zero.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    /// Request timeout as a duration, never zero.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

const fn default_enabled() -> bool {
    true
}

const fn default_interval() -> u64 {
    30
}

const fn default_page_size() -> usize {
    5
}

const fn default_timeout() -> u64 {
    10
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Configuration for transient notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Seconds a notification stays visible.
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
        }
    }
}

impl NotificationConfig {
    /// Time-to-live as a duration.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

const fn default_ttl() -> u64 {
    5
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Sync agent configuration.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Notification configuration.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Path configuration.
    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quote-keeper")
    }

    /// Get the durable store database path.
    #[must_use]
    pub fn storage_db_path(&self) -> PathBuf {
        self.data_dir().join("quotes.db")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }
}

/// The sync agent's phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    /// Waiting for the next tick.
    #[default]
    Idle,
    /// A fetch is in flight.
    Fetching,
}

/// Result of a single sync tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// New server quotes were appended.
    Merged { added: usize },
    /// Every fetched quote was already present.
    UpToDate,
    /// Fetch or parse failed; the repository was not touched.
    Failed { error: String },
}

impl SyncOutcome {
    /// Number of quotes added by this tick.
    #[must_use]
    pub const fn added(&self) -> usize {
        match self {
            Self::Merged { added } => *added,
            Self::UpToDate | Self::Failed { .. } => 0,
        }
    }
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merged { added } => write!(f, "merged {added} new quote(s)"),
            Self::UpToDate => write!(f, "up to date"),
            Self::Failed { error } => write!(f, "failed: {error}"),
        }
    }
}

/// Persisted summary of the most recent sync tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    /// When the last tick finished.
    pub last_sync: Option<DateTime<Utc>>,

    /// What the last tick did.
    pub last_outcome: Option<SyncOutcome>,

    /// Total quotes added by sync since the store was created.
    #[serde(default)]
    pub total_added: usize,
}

impl SyncStatus {
    /// Record a finished tick.
    #[must_use]
    pub fn record(mut self, outcome: SyncOutcome) -> Self {
        self.total_added += outcome.added();
        self.last_sync = Some(Utc::now());
        self.last_outcome = Some(outcome);
        self
    }

    /// Error message of the last tick, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match &self.last_outcome {
            Some(SyncOutcome::Failed { error }) => Some(error),
            _ => None,
        }
    }
}
