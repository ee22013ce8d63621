//! The four-stage entity pipeline.

use super::enrichment::{Enricher, SummaryLookup};
use super::rate_limit::RateLimitWindow;
use super::source::EntitySource;
use super::views::{self, EntityStats, FilterCriteria, SortKey};
use super::wikipedia::WikipediaClient;
use super::{
    EnrichedEntity, NormalizedEntity, RawEntity, RelatedEntity, ScoredEntity, normalize,
    relationships, scoring,
};
use crate::config::EntityScoutConfig;
use crate::{EntityScoutError, Result};
use futures::FutureExt;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Turns one document's raw entities into scored, enriched, related entities.
///
/// Each processor owns its enrichment cache and rate window. Reuse one across
/// documents to share cached lookups, and call [`EntityProcessor::clear_cache`]
/// between unrelated batches to bound memory.
pub struct EntityProcessor {
    config: EntityScoutConfig,
    enricher: Enricher,
}

impl std::fmt::Debug for EntityProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityProcessor")
            .field("enricher", &self.enricher)
            .field("relationships", &self.config.relationships)
            .finish()
    }
}

impl EntityProcessor {
    /// Create a processor that enriches through `lookup`.
    pub fn new(config: EntityScoutConfig, lookup: Arc<dyn SummaryLookup>) -> Self {
        let limiter = RateLimitWindow::from_config(&config.enrichment.rate_limit);
        let enricher = Enricher::new(lookup, limiter, config.enrichment.enabled);
        Self { config, enricher }
    }

    /// Create a processor backed by the Wikipedia REST API.
    pub fn with_wikipedia(config: EntityScoutConfig) -> Result<Self> {
        let client = WikipediaClient::new(&config.enrichment)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub fn config(&self) -> &EntityScoutConfig {
        &self.config
    }

    /// Run the full pipeline, returning an empty list if anything fails.
    ///
    /// Enrichment problems never reach this level; they only leave entities
    /// without a description. An error or panic in any stage is logged and
    /// reported as "no entities".
    pub async fn process_entities(&self, raw_entities: Vec<RawEntity>) -> Vec<RelatedEntity> {
        match AssertUnwindSafe(self.try_process_entities(raw_entities))
            .catch_unwind()
            .await
        {
            Ok(Ok(entities)) => entities,
            Ok(Err(e)) => {
                error!(error = %e, "Entity processing failed");
                Vec::new()
            }
            Err(panic) => {
                error!(
                    panic = panic_message(panic.as_ref()),
                    "Entity processing panicked"
                );
                Vec::new()
            }
        }
    }

    /// Extract entities from `text` with `source`, then run the pipeline.
    ///
    /// Extraction errors are returned; the pipeline itself stays fail-soft.
    pub async fn analyze_text(
        &self,
        source: &dyn EntitySource,
        text: &str,
    ) -> Result<Vec<RelatedEntity>> {
        let raw_entities = source.extract(text).await?;
        debug!(raw_entities = raw_entities.len(), "Extracted entities");
        Ok(self.process_entities(raw_entities).await)
    }

    /// Run the full pipeline: normalize, score, enrich, map relationships.
    pub async fn try_process_entities(
        &self,
        raw_entities: Vec<RawEntity>,
    ) -> Result<Vec<RelatedEntity>> {
        let started = Instant::now();

        let normalized = self.normalize(&raw_entities);
        debug!(entities = normalized.len(), "Normalized entities");

        let scored = self.score(normalized);
        let enriched = self.enrich(scored).await;
        let related = self.map_relationships_blocking(enriched).await?;

        info!(
            entities = related.len(),
            described = related.iter().filter(|e| e.description().is_some()).count(),
            edges = related
                .iter()
                .map(|e| e.relationships.co_occurrences.len())
                .sum::<usize>(),
            cache_size = self.cache_size(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Processed document entities"
        );
        Ok(related)
    }

    pub fn normalize(&self, raw_entities: &[RawEntity]) -> Vec<NormalizedEntity> {
        normalize::normalize_entities(raw_entities)
    }

    pub fn score(&self, entities: Vec<NormalizedEntity>) -> Vec<ScoredEntity> {
        entities
            .into_iter()
            .map(|entity| ScoredEntity {
                calculated_confidence: scoring::calculate_confidence(&entity),
                entity,
            })
            .collect()
    }

    /// Confidence for a single entity; see [`scoring::calculate_confidence`].
    pub fn score_entity(&self, entity: &NormalizedEntity) -> f64 {
        scoring::calculate_confidence(entity)
    }

    pub async fn enrich(&self, entities: Vec<ScoredEntity>) -> Vec<EnrichedEntity> {
        self.enricher.enrich(entities).await
    }

    pub fn map_relationships(&self, entities: Vec<EnrichedEntity>) -> Vec<RelatedEntity> {
        relationships::map_relationships(entities, &self.config.relationships)
    }

    /// Large documents are mapped on the blocking pool so the pairwise scan
    /// does not stall the runtime.
    async fn map_relationships_blocking(
        &self,
        entities: Vec<EnrichedEntity>,
    ) -> Result<Vec<RelatedEntity>> {
        if entities.len() <= self.config.relationships.large_document_threshold {
            return Ok(self.map_relationships(entities));
        }

        let config = self.config.relationships.clone();
        tokio::task::spawn_blocking(move || relationships::map_relationships(entities, &config))
            .await
            .map_err(|e| EntityScoutError::Other(format!("Relationship mapping failed: {}", e)))
    }

    /// Forget every cached lookup, including failures.
    pub fn clear_cache(&self) {
        self.enricher.cache().clear();
    }

    /// Number of links with a settled lookup result.
    pub fn cache_size(&self) -> usize {
        self.enricher.cache().len()
    }

    pub fn filter_entities(
        &self,
        entities: &[RelatedEntity],
        criteria: &FilterCriteria,
    ) -> Vec<RelatedEntity> {
        views::filter_entities(entities, criteria)
    }

    pub fn sort_entities(&self, entities: &[RelatedEntity], key: SortKey) -> Vec<RelatedEntity> {
        views::sort_entities(entities, key)
    }

    pub fn group_entities_by_type(
        &self,
        entities: &[RelatedEntity],
    ) -> BTreeMap<String, Vec<RelatedEntity>> {
        views::group_entities_by_type(entities)
    }

    pub fn entity_stats(&self, entities: &[RelatedEntity]) -> EntityStats {
        views::entity_stats(entities)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
