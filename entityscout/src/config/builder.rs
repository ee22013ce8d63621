//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{Result, models::*, validation};
use std::path::Path;

/// Builder for creating EntityScoutConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: EntityScoutConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: EntityScoutConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: EntityScoutConfig) -> Self {
        Self { config }
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Configure logging to a file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Turn Wikipedia enrichment on or off.
    pub fn with_enrichment_enabled(mut self, enabled: bool) -> Self {
        self.config.enrichment.enabled = enabled;
        self
    }

    /// Point enrichment at a different Wikipedia REST endpoint.
    pub fn with_wikipedia_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.enrichment.wikipedia_base_url = url.into();
        self
    }

    /// Set the lookup rate limit.
    pub fn with_rate_limit(mut self, max_requests: u32, window_ms: u64) -> Self {
        self.config.enrichment.rate_limit = RateLimitConfig {
            max_requests,
            window_ms,
        };
        self
    }

    /// Replace the relationship thresholds.
    pub fn with_relationship_config(mut self, relationships: RelationshipConfig) -> Self {
        self.config.relationships = relationships;
        self
    }

    /// Set the TextRazor API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.extraction.api_key = Some(key.into().trim().to_string());
        self
    }

    /// Point extraction at a different TextRazor endpoint.
    pub fn with_extraction_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.extraction.base_url = url.into();
        self
    }

    /// Configuration for development: debug logging in pretty format.
    pub fn development() -> Self {
        Self::new()
            .with_log_level(LogLevel::Debug)
            .with_log_format(LogFormat::Pretty)
    }

    /// Configuration for automated tests: no network enrichment, quiet logs.
    pub fn testing() -> Self {
        Self::new()
            .with_enrichment_enabled(false)
            .with_log_level(LogLevel::Warn)
    }

    /// Build the configuration, validating it in the process.
    pub fn build(self) -> Result<EntityScoutConfig> {
        validation::validate_config(&self.config)?;

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
