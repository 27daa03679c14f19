//! JSON export and import of the quote list.

use std::path::Path;

use serde_json::Value;

use crate::domain::{AppError, Quote, Result};

/// Default export file name.
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// Serialize quotes as pretty-printed JSON (2-space indent).
///
/// # Errors
/// Returns error if serialization fails.
pub fn export_json(quotes: &[Quote]) -> Result<String> {
    serde_json::to_string_pretty(quotes).map_err(AppError::serialization)
}

/// Write an export file.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub async fn write_export(path: &Path, quotes: &[Quote]) -> Result<()> {
    let json = export_json(quotes)?;

    tokio::fs::write(path, json)
        .await
        .map_err(|e| AppError::io(format!("Failed to write {}", path.display()), e))?;

    tracing::info!(path = %path.display(), count = quotes.len(), "Exported quotes");
    Ok(())
}

/// Parse the text of an import file.
///
/// # Errors
/// Returns a validation error carrying the user-facing message if the
/// text is not JSON, not an array, or contains an element that is not a
/// quote with non-empty text and category.
pub fn parse_import(text: &str) -> Result<Vec<Quote>> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        tracing::debug!(error = %e, "Import is not valid JSON");
        AppError::validation("Error parsing JSON file.")
    })?;

    let Value::Array(items) = value else {
        return Err(AppError::validation("Invalid JSON format."));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Quote>(item)
                .ok()
                .filter(Quote::is_valid)
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "Invalid quote at index {index}: expected non-empty \"text\" and \"category\"."
                    ))
                })
        })
        .collect()
}

/// Read and parse an import file.
///
/// # Errors
/// Returns error if the file cannot be read or fails [`parse_import`].
pub async fn read_import(path: &Path) -> Result<Vec<Quote>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(format!("Failed to read {}", path.display()), e))?;

    parse_import(&text)
}
