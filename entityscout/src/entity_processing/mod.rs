//! Entity post-processing pipeline.
//!
//! Raw entities from an extraction service pass through four stages:
//!
//! 1. **normalize**: stable ids, defaults for missing fields, scores clamped
//! 2. **score**: weighted confidence with presence bonuses
//! 3. **enrich**: cached, rate-limited Wikipedia summary lookups
//! 4. **map relationships**: co-occurrence and positional edges per pair
//!
//! [`EntityProcessor`] runs them in order. The stage functions are public so
//! callers can run pieces of the pipeline on their own.

mod types;

pub mod enrichment;
pub mod normalize;
pub mod processor;
pub mod rate_limit;
pub mod relationships;
pub mod scoring;
pub mod source;
pub mod textrazor;
pub mod views;
pub mod wikipedia;

pub use types::*;

pub use enrichment::{EnrichmentCache, SummaryLookup};
pub use processor::EntityProcessor;
pub use rate_limit::RateLimitWindow;
pub use relationships::{RelationshipAnalysis, analyze_relationship, text_similarity};
pub use source::{EntitySource, JsonFileSource, parse_raw_entities};
pub use textrazor::{RetryPolicy, TextRazorClient};
pub use views::{
    EntityStats, FilterCriteria, SortKey, entity_stats, filter_entities, group_entities_by_type,
    sort_entities,
};
pub use wikipedia::{WikipediaClient, extract_wikipedia_title};
