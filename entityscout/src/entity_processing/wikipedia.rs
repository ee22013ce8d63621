//! Wikipedia REST summary client.

use super::WikipediaSummary;
use super::enrichment::SummaryLookup;
use crate::config::EnrichmentConfig;
use crate::{EntityScoutError, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// Article title from a `.../wiki/<Title>` link, percent-decoded.
pub fn extract_wikipedia_title(link: &str) -> Option<String> {
    lazy_static! {
        static ref WIKI_TITLE: Regex = Regex::new(r"/wiki/(.+)$").unwrap();
    }

    let encoded = WIKI_TITLE.captures(link)?.get(1)?.as_str();
    urlencoding::decode(encoded).ok().map(|title| title.into_owned())
}

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
    #[serde(default)]
    pageid: Option<u64>,
    #[serde(default)]
    categories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: Option<String>,
}

impl From<SummaryPayload> for WikipediaSummary {
    fn from(payload: SummaryPayload) -> Self {
        Self {
            extract: payload.extract.unwrap_or_default(),
            thumbnail: payload.thumbnail.and_then(|t| t.source),
            page_id: payload.pageid.unwrap_or_default(),
            categories: payload.categories.unwrap_or_default(),
        }
    }
}

/// [`SummaryLookup`] backed by `GET {base}/page/summary/{title}`.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: reqwest::Client,
    base_url: String,
}

impl WikipediaClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| EntityScoutError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.wikipedia_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn summary_url(&self, title: &str) -> String {
        format!(
            "{}/page/summary/{}",
            self.base_url,
            urlencoding::encode(title)
        )
    }
}

#[async_trait]
impl SummaryLookup for WikipediaClient {
    async fn fetch_summary(&self, link: &str) -> Result<Option<WikipediaSummary>> {
        let Some(title) = extract_wikipedia_title(link) else {
            debug!(link, "No article title in link");
            return Ok(None);
        };

        let url = self.summary_url(&title);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| EntityScoutError::Lookup(format!("Wikipedia API error: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(title = %title, "Wikipedia page not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(EntityScoutError::Lookup(format!(
                "Wikipedia API error: HTTP {}",
                status.as_u16()
            )));
        }

        let payload: SummaryPayload = response
            .json()
            .await
            .map_err(|e| EntityScoutError::Lookup(format!("Wikipedia API error: {}", e)))?;

        Ok(Some(payload.into()))
    }
}
