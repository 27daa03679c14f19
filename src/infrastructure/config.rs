//! Configuration file management.
//!
//! Handles loading and saving TOML configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Quote Keeper Configuration
# Auto-generated - edit as needed

[sync]
# Whether the interactive shell polls the remote endpoint
enabled = true

# Interval between sync ticks in seconds (default: 30)
interval_secs = 30

# Number of remote items merged per tick
page_size = 5

# Request timeout in seconds
timeout_secs = 10

# Remote endpoint returning a JSON array of objects with a "title" field
endpoint = "https://jsonplaceholder.typicode.com/posts"

[notifications]
# Seconds a notification banner stays visible
ttl_secs = 5

[paths]
# Custom data directory (optional, defaults to ~/.quote-keeper)
# data_dir = "/custom/path"
"#;

/// Load configuration from the data directory or fall back to defaults.
///
/// When `data_dir` is given it overrides both the default location and
/// any `paths.data_dir` in the file.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config(data_dir: Option<&Path>) -> Result<AppConfig> {
    let base = data_dir.map_or_else(AppConfig::default_data_dir, Path::to_path_buf);
    let config_path = base.join("config.toml");

    let mut config = if config_path.exists() {
        load_config_from_file(&config_path)?
    } else {
        AppConfig::default()
    };

    if let Some(dir) = data_dir {
        config.paths.data_dir = Some(dir.to_path_buf());
    }

    Ok(config)
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Render the effective configuration as TOML.
///
/// # Errors
/// Returns error if serialization fails.
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize config: {e}"),
    })
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns the config path and whether it was created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config: &AppConfig) -> Result<(PathBuf, bool)> {
    let config_path = config.config_file_path();

    if config_path.exists() {
        return Ok((config_path, false));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok((config_path, true))
}
