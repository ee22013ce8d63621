//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &EntityScoutConfig) -> Result<(), ConfigError> {
    validate_enrichment_config(&config.enrichment)?;
    validate_relationship_config(&config.relationships)?;
    validate_extraction_config(&config.extraction)?;

    Ok(())
}

/// Validate enrichment configuration.
fn validate_enrichment_config(config: &EnrichmentConfig) -> Result<(), ConfigError> {
    if config.enabled && config.wikipedia_base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Wikipedia base URL cannot be empty when enrichment is enabled".to_string(),
        ));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Enrichment request timeout must be greater than 0".to_string(),
        ));
    }

    if config.rate_limit.window_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Rate limit window must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate relationship thresholds.
fn validate_relationship_config(config: &RelationshipConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.cooccurrence_threshold) {
        return Err(ConfigError::ValidationError(format!(
            "Co-occurrence threshold must be within [0, 1], got {}",
            config.cooccurrence_threshold
        )));
    }

    if config.positional_distance > config.neighbor_window {
        return Err(ConfigError::ValidationError(format!(
            "Positional distance ({}) cannot exceed the neighbor window ({})",
            config.positional_distance, config.neighbor_window
        )));
    }

    if config.proximity_distance > config.neighbor_window {
        return Err(ConfigError::ValidationError(format!(
            "Proximity distance ({}) cannot exceed the neighbor window ({})",
            config.proximity_distance, config.neighbor_window
        )));
    }

    Ok(())
}

/// Validate extraction service configuration.
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "TextRazor base URL cannot be empty".to_string(),
        ));
    }

    if let Some(key) = &config.api_key
        && key.trim().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "TextRazor API key cannot be blank; omit it instead".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.min_confidence) {
        return Err(ConfigError::ValidationError(format!(
            "Extraction min_confidence must be within [0, 1], got {}",
            config.min_confidence
        )));
    }

    if config.max_text_length == 0 {
        return Err(ConfigError::ValidationError(
            "max_text_length must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
