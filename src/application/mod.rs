//! Application layer - use cases and orchestration.
//!
//! This layer owns the quote session and the components that act on it:
//! display, transfer, notifications, and the remote sync agent.

pub mod display;
pub mod formatter;
pub mod notifier;
pub mod quote_store;
pub mod repository;
pub mod session;
pub mod sync_service;
pub mod transfer;

pub use formatter::{
    format_banner, format_categories, format_quotes, format_rendered, format_sync_status,
    OutputFormat,
};
pub use quote_store::QuoteStore;
pub use session::QuoteSession;
pub use sync_service::{SharedSession, SyncAgent};
pub use transfer::{read_import, write_export, EXPORT_FILE_NAME};
