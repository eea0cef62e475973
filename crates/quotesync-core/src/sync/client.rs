//! HTTP client for the remote quote endpoint
//!
//! The endpoint serves generic records (anything with a `title`), which are
//! mapped into quotes under a fixed category. Pushing sends the full local
//! collection as a JSON body; the endpoint is not expected to keep it.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::Quote;

/// Errors talking to the remote endpoint
#[derive(Error, Debug)]
pub enum SyncError {
    /// Could not build the HTTP client
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network failure or timeout
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status
    #[error("Server {url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// Body was not the expected shape
    #[error("Unexpected response from {url}: {details}")]
    Decode { url: String, details: String },

    /// Server data could not be applied locally
    #[error("Failed to apply server data: {0:#}")]
    Apply(anyhow::Error),
}

/// Client for the remote quote endpoint
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    url: String,
    limit: usize,
    category: String,
}

impl RemoteClient {
    /// Create a client from the sync settings in `config`
    pub fn from_config(config: &Config) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout(config))
            .user_agent(concat!("quotesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SyncError::Client)?;

        Ok(Self {
            http,
            url: config.server_url.clone(),
            limit: config.remote_limit,
            category: config.remote_category.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the remote snapshot
    pub async fn fetch(&self) -> Result<Vec<Quote>, SyncError> {
        debug!("Fetching remote quotes from {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|source| self.request_error(source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body: Value = response.json().await.map_err(|e| SyncError::Decode {
            url: self.url.clone(),
            details: e.to_string(),
        })?;

        map_remote_records(&body, self.limit, &self.category).map_err(|details| {
            SyncError::Decode {
                url: self.url.clone(),
                details,
            }
        })
    }

    /// Send the full local collection to the endpoint
    ///
    /// Returns the response status; callers only log it.
    pub async fn push(&self, quotes: &[Quote]) -> Result<StatusCode, SyncError> {
        debug!("Pushing {} quotes to {}", quotes.len(), self.url);
        let response = self
            .http
            .post(&self.url)
            .json(quotes)
            .send()
            .await
            .map_err(|source| self.request_error(source))?;

        Ok(response.status())
    }

    fn request_error(&self, source: reqwest::Error) -> SyncError {
        SyncError::Request {
            url: self.url.clone(),
            source,
        }
    }
}

/// Map the endpoint's records into quotes
///
/// Takes the first `limit` records of the array; each one's `title` becomes
/// the quote text and `category` is applied to all. Records without a
/// string title are dropped.
pub fn map_remote_records(body: &Value, limit: usize, category: &str) -> Result<Vec<Quote>, String> {
    let records = body
        .as_array()
        .ok_or_else(|| "expected a JSON array of records".to_string())?;

    Ok(records
        .iter()
        .take(limit)
        .filter_map(|record| record.get("title").and_then(Value::as_str))
        .map(|title| Quote::new(title, category))
        .collect())
}

/// Per-request timeout; a zero in the config file still gets one second
fn request_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.request_timeout_secs.max(1))
}
