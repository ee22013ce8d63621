//! Configuration model definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for EntityScout.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EntityScoutConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Wikipedia enrichment configuration
    pub enrichment: EnrichmentConfig,

    /// Relationship mapping configuration
    pub relationships: RelationshipConfig,

    /// Entity extraction service configuration
    pub extraction: ExtractionConfig,
}

/// Configuration for Wikipedia summary enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Whether summary lookups are issued at all
    pub enabled: bool,

    /// Base URL of the Wikipedia REST API
    pub wikipedia_base_url: String,

    /// User agent sent with every lookup
    pub user_agent: String,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Admission control for outbound lookups
    pub rate_limit: RateLimitConfig,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wikipedia_base_url: "https://en.wikipedia.org/api/rest_v1".to_string(),
            user_agent: format!("EntityScout/{}", crate::VERSION),
            request_timeout_ms: 10_000,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl EnrichmentConfig {
    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Fixed-window rate limit for summary lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Lookups admitted per window
    pub max_requests: u32,

    /// Window length in milliseconds
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 50,
            window_ms: 60_000,
        }
    }
}

/// Thresholds used when deriving relationships between entities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Co-occurrence edges are kept only above this strength
    pub cooccurrence_threshold: f64,

    /// Maximum offset distance for a positional edge
    pub positional_distance: usize,

    /// Offset distance under which the proximity bonus applies
    pub proximity_distance: usize,

    /// Documents with more entities than this use the windowed scan
    pub large_document_threshold: usize,

    /// Candidate window for the windowed scan
    pub neighbor_window: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            cooccurrence_threshold: 0.3,
            positional_distance: 100,
            proximity_distance: 50,
            large_document_threshold: 500,
            neighbor_window: 200,
        }
    }
}

/// Configuration for the TextRazor extraction service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// TextRazor API key
    pub api_key: Option<String>,

    /// TextRazor base URL
    pub base_url: String,

    /// Comma-separated list of TextRazor extractors
    pub extractors: String,

    /// Minimum confidence requested from the service
    pub min_confidence: f64,

    /// Cleanup mode applied to submitted text
    pub cleanup_mode: String,

    /// Texts longer than this (in characters) are truncated
    pub max_text_length: usize,

    /// Retries for rate-limited or failed requests
    pub max_retries: u32,

    /// Initial backoff in milliseconds
    pub initial_backoff_ms: u64,

    /// Backoff cap in milliseconds
    pub max_backoff_ms: u64,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.textrazor.com".to_string(),
            extractors: "entities,topics".to_string(),
            min_confidence: 0.5,
            cleanup_mode: "cleanHTML".to_string(),
            max_text_length: 200_000,
            max_retries: 3,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10_000,
            request_timeout_ms: 30_000,
        }
    }
}

/// Configuration for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,

    /// Debug level
    Debug,

    /// Info level
    Info,

    /// Warn level
    Warn,

    /// Error level
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
