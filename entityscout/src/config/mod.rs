//! Configuration system for EntityScout.
//!
//! Configuration is layered: built-in defaults, then the first configuration
//! file found, then `ENTITYSCOUT_`-prefixed environment variables. Every layer
//! is validated before it reaches the pipeline.

mod builder;
mod loader;
mod models;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "entityscout.toml",
    "entityscout.yaml",
    "entityscout.yml",
    "entityscout.json",
    ".entityscout/config.toml",
    ".entityscout/config.yaml",
    ".entityscout/config.yml",
    ".entityscout/config.json",
];

/// Environment variable prefix for EntityScout configuration
pub const ENV_PREFIX: &str = "ENTITYSCOUT_";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
