//! TextRazor entity extraction client.
//!
//! Sends one analysis request per document as form data. Rate-limit responses
//! (429) and transport failures are retried with exponential backoff; every
//! other failure is returned immediately.

use super::RawEntity;
use super::source::{EntitySource, parse_raw_entities};
use crate::config::ExtractionConfig;
use crate::{EntityScoutError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

const API_KEY_HEADER: &str = "X-TextRazor-Key";

/// Backoff schedule for retried extraction requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f32,
    /// Upper bound on a single wait
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff_ms: config.initial_backoff_ms,
            backoff_multiplier: 2.0,
            max_backoff_ms: config.max_backoff_ms,
        }
    }

    /// Wait before retry number `attempt + 1`.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff_ms =
            (self.initial_backoff_ms as f32 * self.backoff_multiplier.powi(attempt as i32)) as u64;
        Duration::from_millis(backoff_ms.min(self.max_backoff_ms))
    }
}

/// Outcome of a single request.
enum AttemptError {
    Retry(EntityScoutError),
    Fatal(EntityScoutError),
}

/// [`EntitySource`] backed by the TextRazor REST API.
#[derive(Debug, Clone)]
pub struct TextRazorClient {
    client: reqwest::Client,
    config: ExtractionConfig,
    retry_policy: RetryPolicy,
}

impl TextRazorClient {
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| EntityScoutError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retry_policy: RetryPolicy::from_config(&config),
            config,
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Extract entities from `text`.
    pub async fn analyze(&self, text: &str) -> Result<Vec<RawEntity>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(EntityScoutError::MissingApiKey)?;

        if text.trim().is_empty() {
            return Err(EntityScoutError::EmptyText);
        }

        let text = truncate_chars(text, self.config.max_text_length);
        let form = self.form(&text);

        let mut attempt = 0;
        loop {
            match self.send_request(api_key, &form).await {
                Ok(entities) => {
                    debug!(
                        entities = entities.len(),
                        attempts = attempt + 1,
                        "TextRazor analysis succeeded"
                    );
                    return Ok(entities);
                }
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retry(e)) if attempt < self.retry_policy.max_retries => {
                    let backoff = self.retry_policy.backoff_duration(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.retry_policy.max_retries + 1,
                        ?backoff,
                        error = %e,
                        "TextRazor request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(AttemptError::Retry(e)) => {
                    warn!(
                        attempts = attempt + 1,
                        error = %e,
                        "TextRazor request failed, giving up"
                    );
                    return Err(e);
                }
            }
        }
    }

    fn form(&self, text: &str) -> Vec<(&'static str, String)> {
        vec![
            ("text", text.to_string()),
            ("extractors", self.config.extractors.clone()),
            ("entities", "true".to_string()),
            ("entities_confidence", self.config.min_confidence.to_string()),
            ("entities_dbpedia", "true".to_string()),
            ("entities_freebase", "true".to_string()),
            ("cleanup_mode", self.config.cleanup_mode.clone()),
            ("cleanup_return_cleaned", "true".to_string()),
            ("cleanup_return_raw", "false".to_string()),
        ]
    }

    async fn send_request(
        &self,
        api_key: &str,
        form: &[(&'static str, String)],
    ) -> std::result::Result<Vec<RawEntity>, AttemptError> {
        let url = format!("{}/", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                AttemptError::Retry(EntityScoutError::Http(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptError::Retry(EntityScoutError::Extraction(
                "rate limit exceeded, try again later".to_string(),
            )));
        }
        if status == StatusCode::FORBIDDEN {
            return Err(AttemptError::Fatal(EntityScoutError::Extraction(
                "quota exceeded or invalid API key".to_string(),
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Fatal(EntityScoutError::Extraction(format!(
                "API request failed: {} - {}",
                status.as_u16(),
                body
            ))));
        }

        let body = response.text().await.map_err(|e| {
            AttemptError::Retry(EntityScoutError::Http(format!("Failed to read response: {}", e)))
        })?;
        parse_raw_entities(&body).map_err(AttemptError::Fatal)
    }
}

#[async_trait]
impl EntitySource for TextRazorClient {
    async fn extract(&self, text: &str) -> Result<Vec<RawEntity>> {
        self.analyze(text).await
    }
}

/// At most `max` characters of `text`, warning when anything was cut.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            warn!(
                limit = max,
                "Text exceeds the extraction limit and was truncated"
            );
            text[..cut].to_string()
        }
        None => text.to_string(),
    }
}
