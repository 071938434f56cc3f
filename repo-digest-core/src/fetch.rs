//! HTTP implementation of [`ArchiveFetcher`] with one timeout/retry policy.
//!
//! - every request is bounded by the configured timeout
//! - transport errors, timeouts and non-404 error statuses are retried with
//!   exponential backoff until `max_attempts` is used up, then surface as
//!   [`SourceError::Unreachable`]
//! - a 404 is not retried and surfaces as [`SourceError::NotFound`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{error, info, warn};

use crate::config::FetchConfig;
use crate::contract::ArchiveFetcher;
use crate::error::SourceError;

pub struct HttpFetcher {
    client: Client,
    max_attempts: u32,
    initial_backoff: Duration,
}

/// Outcome of a single failed attempt.
enum AttemptError {
    Fatal(SourceError),
    Retry(String),
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("repo-digest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to construct HTTP client");
                SourceError::HttpClient(e.to_string())
            })?;
        Ok(Self {
            client,
            max_attempts: config.attempts(),
            initial_backoff: config.initial_backoff(),
        })
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>, AttemptError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::Retry(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AttemptError::Fatal(SourceError::not_found(url)));
        }
        if !status.is_success() {
            return Err(AttemptError::Retry(format!("HTTP status {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Retry(e.to_string()))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let mut backoff = self.initial_backoff;
        let mut last_reason = String::new();

        for attempt in 1..=self.max_attempts {
            match self.attempt(url).await {
                Ok(bytes) => {
                    info!(url, attempt, size = bytes.len(), "Fetched archive");
                    return Ok(bytes);
                }
                Err(AttemptError::Fatal(e)) => {
                    error!(url, attempt, error = %e, "Archive fetch failed permanently");
                    return Err(e);
                }
                Err(AttemptError::Retry(reason)) => {
                    warn!(
                        url,
                        attempt,
                        max_attempts = self.max_attempts,
                        reason = %reason,
                        "Archive fetch attempt failed"
                    );
                    last_reason = reason;
                    if attempt < self.max_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        error!(url, attempts = self.max_attempts, "Giving up on archive fetch");
        Err(SourceError::Unreachable {
            url: url.to_string(),
            attempts: self.max_attempts,
            reason: last_reason,
        })
    }
}
