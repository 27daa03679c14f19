//! Domain layer - core types and errors.
//!
//! This layer contains pure domain models and error types
//! without any external dependencies (DB, IO, etc.).

pub mod error;
pub mod models;
pub mod sync;

pub use error::{AppError, Result};
pub use models::{seed_quotes, CategoryFilter, Quote, ALL_CATEGORIES, SERVER_CATEGORY};
pub use sync::{AppConfig, SyncConfig, SyncOutcome, SyncPhase, SyncStatus};
