//! # EntityScout
//!
//! Post-processing for entities returned by an extraction service such as
//! TextRazor: normalization, weighted confidence scoring, Wikipedia summary
//! enrichment behind a rate limit, and relationship mapping between the
//! entities of one document.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use entityscout::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let processor = init_with_defaults()?;
//!
//!     let raw: Vec<RawEntity> = serde_json::from_str(
//!         r#"[{"matchedText": "Apple Inc", "type": "Organization", "confidenceScore": 0.8}]"#,
//!     )?;
//!
//!     let entities = processor.process_entities(raw).await;
//!     for entity in &entities {
//!         println!("{} {:.2}", entity.text(), entity.calculated_confidence());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **entity_processing**: the four-stage pipeline and read-only views
//! - **config**: layered configuration (defaults, files, environment)
//! - **logging**: tracing subscriber setup

pub mod config;
pub mod entity_processing;
pub mod logging;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::{init, init_with_defaults};

    pub use crate::config::{
        ConfigBuilder, ConfigLoader, EnrichmentConfig, EntityScoutConfig, ExtractionConfig,
        LogFormat, LogLevel, LoggingConfig, RelationshipConfig,
    };

    pub use crate::entity_processing::{
        EntityProcessor, EntitySource, EntityStats, FilterCriteria, NormalizedEntity, RawEntity,
        RelatedEntity, RelationType, SortKey, SummaryLookup, TextRazorClient, WikipediaClient,
        WikipediaSummary,
    };

    pub use crate::{EntityScoutError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for EntityScout operations
#[derive(Debug, thiserror::Error)]
pub enum EntityScoutError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Summary lookup failed (network, HTTP status or payload)
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Entity extraction service failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// HTTP client could not be built or the request could not be sent
    #[error("HTTP error: {0}")]
    Http(String),

    /// Payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(String),

    /// No extraction API key was configured
    #[error(
        "TextRazor API key not configured. Set ENTITYSCOUT_EXTRACTION__API_KEY or use ConfigBuilder::with_api_key"
    )]
    MissingApiKey,

    /// Extraction was requested for empty text
    #[error("Text content is required for entity extraction")]
    EmptyText,

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for EntityScoutError {
    fn from(err: crate::config::ConfigError) -> Self {
        EntityScoutError::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for EntityScoutError {
    fn from(err: serde_json::Error) -> Self {
        EntityScoutError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EntityScoutError {
    fn from(err: std::io::Error) -> Self {
        EntityScoutError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for EntityScoutError {
    fn from(err: reqwest::Error) -> Self {
        EntityScoutError::Http(err.to_string())
    }
}

/// Result type for EntityScout operations
pub type Result<T> = std::result::Result<T, EntityScoutError>;

/// Initialize EntityScout with configuration loaded from the default files and
/// the `ENTITYSCOUT_` environment.
pub fn init_with_defaults() -> Result<entity_processing::EntityProcessor> {
    let config = config::ConfigLoader::new()
        .load_default_files()
        .load_env()
        .extract()?;
    init(config)
}

/// Initialize EntityScout with the provided configuration
///
/// Sets up logging and returns an [`entity_processing::EntityProcessor`] that
/// enriches entities from the Wikipedia REST API.
///
/// # Examples
///
/// ```rust,no_run
/// use entityscout::prelude::*;
///
/// fn example() -> Result<()> {
///     let config = ConfigBuilder::new()
///         .with_log_level(LogLevel::Debug)
///         .with_rate_limit(20, 60_000)
///         .build()?;
///
///     let processor = init(config)?;
///     assert_eq!(processor.cache_size(), 0);
///     Ok(())
/// }
/// ```
pub fn init(config: config::EntityScoutConfig) -> Result<entity_processing::EntityProcessor> {
    // Ignore errors if tracing is already initialized
    let _ = logging::init(&config.logging);

    entity_processing::EntityProcessor::with_wikipedia(config)
}
