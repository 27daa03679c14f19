//! Remote quote source over HTTP.
//!
//! The endpoint returns a JSON array of objects; only the `title` field of
//! the first few elements is used.

use std::future::Future;

use serde_json::Value;

use crate::domain::{AppError, Result, SyncConfig};

/// Anything that can produce a page of remote titles.
pub trait RemoteSource: Send + Sync {
    /// Fetch up to `limit` titles.
    fn fetch_titles(&self, limit: usize) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// `reqwest`-backed source with a request timeout.
pub struct HttpRemoteSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRemoteSource {
    /// Build a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("quote-keeper/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AppError::http)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The endpoint this source polls.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl RemoteSource for HttpRemoteSource {
    async fn fetch_titles(&self, limit: usize) -> Result<Vec<String>> {
        tracing::debug!(endpoint = %self.endpoint, "Fetching remote quotes");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(AppError::http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Remote {
                message: format!("HTTP {status} from {}", self.endpoint),
                source: None,
            });
        }

        let body: Value = response.json().await.map_err(AppError::http)?;
        parse_titles(&body, limit)
    }
}

/// Extract the first `limit` titles from a response body.
///
/// # Errors
/// Returns error if the body is not an array or a consumed element lacks
/// a string `title`.
pub fn parse_titles(body: &Value, limit: usize) -> Result<Vec<String>> {
    let items = body.as_array().ok_or_else(|| AppError::Remote {
        message: "Expected a JSON array".into(),
        source: None,
    })?;

    items
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, item)| {
            item.get("title")
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| AppError::Remote {
                    message: format!("Item {index} has no string 'title'"),
                    source: None,
                })
        })
        .collect()
}
