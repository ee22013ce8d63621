//! Read-only views over processed entities.

use super::RelatedEntity;
use super::normalize::UNKNOWN_TYPE;
use crate::EntityScoutError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Conditions an entity must meet to be kept by [`filter_entities`].
///
/// Unset fields do not constrain anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    pub min_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
    /// Keep only these types (ignored when empty)
    pub types: Vec<String>,
    pub exclude_types: Vec<String>,
    /// Bounds on the surface form length in characters
    pub min_text_length: Option<usize>,
    pub max_text_length: Option<usize>,
    pub require_wikipedia: bool,
    /// Case-insensitive substring of the surface form
    pub search_text: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_confidence(mut self, min: f64) -> Self {
        self.min_confidence = Some(min);
        self
    }

    pub fn with_max_confidence(mut self, max: f64) -> Self {
        self.max_confidence = Some(max);
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_text_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_text_length = min;
        self.max_text_length = max;
        self
    }

    pub fn require_wikipedia(mut self) -> Self {
        self.require_wikipedia = true;
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Whether `entity` passes every configured condition.
    pub fn matches(&self, entity: &RelatedEntity) -> bool {
        let confidence = entity.calculated_confidence();
        if self.min_confidence.is_some_and(|min| confidence < min) {
            return false;
        }
        if self.max_confidence.is_some_and(|max| confidence > max) {
            return false;
        }

        let entity_type = entity.entity_type();
        if !self.types.is_empty() && !self.types.iter().any(|t| t == entity_type) {
            return false;
        }
        if self.exclude_types.iter().any(|t| t == entity_type) {
            return false;
        }

        let length = entity.text().chars().count();
        if self.min_text_length.is_some_and(|min| length < min) {
            return false;
        }
        if self.max_text_length.is_some_and(|max| length > max) {
            return false;
        }

        if self.require_wikipedia && entity.wikipedia_link().is_none() {
            return false;
        }

        match self.search_text.as_deref() {
            Some(search) if !search.is_empty() => entity
                .text()
                .to_lowercase()
                .contains(&search.to_lowercase()),
            _ => true,
        }
    }
}

/// Entities matching `criteria`, in their original order.
pub fn filter_entities(entities: &[RelatedEntity], criteria: &FilterCriteria) -> Vec<RelatedEntity> {
    entities
        .iter()
        .filter(|entity| criteria.matches(entity))
        .cloned()
        .collect()
}

/// Ordering applied by [`sort_entities`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Highest calculated confidence first
    #[default]
    Confidence,
    /// Highest service-reported relevance first
    Relevance,
    Text,
    Type,
    /// Earliest starting offset first
    Position,
    /// Surface form, ignoring case
    Alphabetical,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Confidence => "confidence",
            SortKey::Relevance => "relevance",
            SortKey::Text => "text",
            SortKey::Type => "type",
            SortKey::Position => "position",
            SortKey::Alphabetical => "alphabetical",
        }
    }

    fn compare(&self, a: &RelatedEntity, b: &RelatedEntity) -> Ordering {
        match self {
            SortKey::Confidence => b
                .calculated_confidence()
                .total_cmp(&a.calculated_confidence()),
            SortKey::Relevance => b
                .entity()
                .relevance_score
                .total_cmp(&a.entity().relevance_score),
            SortKey::Text => a.text().cmp(b.text()),
            SortKey::Type => a.entity_type().cmp(b.entity_type()),
            SortKey::Position => a.entity().starting_pos.cmp(&b.entity().starting_pos),
            SortKey::Alphabetical => a.text().to_lowercase().cmp(&b.text().to_lowercase()),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = EntityScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "confidence" => Ok(SortKey::Confidence),
            "relevance" => Ok(SortKey::Relevance),
            "text" => Ok(SortKey::Text),
            "type" => Ok(SortKey::Type),
            "position" => Ok(SortKey::Position),
            "alphabetical" => Ok(SortKey::Alphabetical),
            other => Err(EntityScoutError::Other(format!("Unknown sort key: {}", other))),
        }
    }
}

/// A sorted copy of `entities`. The sort is stable.
pub fn sort_entities(entities: &[RelatedEntity], key: SortKey) -> Vec<RelatedEntity> {
    let mut sorted = entities.to_vec();
    sorted.sort_by(|a, b| key.compare(a, b));
    sorted
}

/// Entities bucketed by type label, each bucket sorted by confidence.
pub fn group_entities_by_type(entities: &[RelatedEntity]) -> BTreeMap<String, Vec<RelatedEntity>> {
    let mut grouped: BTreeMap<String, Vec<RelatedEntity>> = BTreeMap::new();
    for entity in entities {
        grouped
            .entry(type_label(entity).to_string())
            .or_default()
            .push(entity.clone());
    }

    for group in grouped.values_mut() {
        group.sort_by(|a, b| SortKey::Confidence.compare(a, b));
    }
    grouped
}

/// Aggregate counts over a set of processed entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    /// Mean calculated confidence; 0 for an empty set
    pub avg_confidence: f64,
    pub has_wikipedia: usize,
    pub has_description: usize,
}

pub fn entity_stats(entities: &[RelatedEntity]) -> EntityStats {
    let mut stats = EntityStats {
        total: entities.len(),
        ..EntityStats::default()
    };

    let mut total_confidence = 0.0;
    for entity in entities {
        *stats
            .by_type
            .entry(type_label(entity).to_string())
            .or_default() += 1;
        total_confidence += entity.calculated_confidence();

        if entity.wikipedia_link().is_some() {
            stats.has_wikipedia += 1;
        }
        if entity.description().is_some() {
            stats.has_description += 1;
        }
    }

    if !entities.is_empty() {
        stats.avg_confidence = total_confidence / entities.len() as f64;
    }
    stats
}

fn type_label(entity: &RelatedEntity) -> &str {
    match entity.entity_type() {
        "" => UNKNOWN_TYPE,
        label => label,
    }
}
