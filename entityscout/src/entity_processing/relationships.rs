//! Pairwise relationships between the entities of one document.
//!
//! Two kinds of edge are derived for a pair:
//!
//! - a co-occurrence edge when [`analyze_relationship`] scores the pair above
//!   `cooccurrence_threshold`
//! - a positional edge when their starting offsets are at most
//!   `positional_distance` apart, regardless of strength
//!
//! Both are mirrored onto the two entities. Small documents compare every pair.
//! Documents larger than `large_document_threshold` only compare pairs whose
//! offsets are within `neighbor_window`, found with a sliding window over the
//! entities sorted by offset. Each entity lists its edges in ascending order of
//! the partner's position in the input.

use super::{
    CoOccurrence, EnrichedEntity, PositionalLink, RelatedEntity, RelationType, Relationships,
};
use crate::config::RelationshipConfig;
use std::collections::HashSet;
use tracing::debug;

const SAME_TYPE_WEIGHT: f64 = 0.2;
const SHARED_CATEGORY_WEIGHT: f64 = 0.3;
const PROXIMITY_WEIGHT: f64 = 0.4;
const TEXT_SIMILARITY_WEIGHT: f64 = 0.3;

/// Strength and label computed for a pair of entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationshipAnalysis {
    pub strength: f64,
    pub relation_type: RelationType,
}

/// Case-insensitive similarity of two surface forms in `[0, 1]`.
///
/// Identical strings score 1, containment scores 0.7, otherwise the score is
/// the share of whitespace tokens the two have in common.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return 1.0;
    }
    if a.contains(&b) || b.contains(&a) {
        return 0.7;
    }

    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    let total = words_a.len() + b.split_whitespace().count();
    let common = words_a.iter().filter(|w| words_b.contains(*w)).count();

    if common == 0 || total == 0 {
        return 0.0;
    }
    // Repeated tokens in `a` can push the ratio past 1.
    ((common * 2) as f64 / total as f64).min(1.0)
}

/// True if any category of `a` equals any category of `b`, ignoring case.
pub fn share_categories(a: &EnrichedEntity, b: &EnrichedEntity) -> bool {
    if a.categories.is_empty() || b.categories.is_empty() {
        return false;
    }

    let lowered: HashSet<String> = a.categories.iter().map(|c| c.to_lowercase()).collect();
    b.categories
        .iter()
        .any(|c| lowered.contains(&c.to_lowercase()))
}

fn offset_distance(a: &EnrichedEntity, b: &EnrichedEntity) -> usize {
    a.entity().starting_pos.abs_diff(b.entity().starting_pos)
}

/// Score how strongly two entities relate.
///
/// A shared category labels the pair `semantic` even when the types also
/// match.
pub fn analyze_relationship(
    a: &EnrichedEntity,
    b: &EnrichedEntity,
    config: &RelationshipConfig,
) -> RelationshipAnalysis {
    let mut strength = 0.0;
    let mut relation_type = RelationType::Cooccurrence;

    if a.entity().entity_type == b.entity().entity_type {
        strength += SAME_TYPE_WEIGHT;
        relation_type = RelationType::SameType;
    }

    if share_categories(a, b) {
        strength += SHARED_CATEGORY_WEIGHT;
        relation_type = RelationType::Semantic;
    }

    if offset_distance(a, b) <= config.proximity_distance {
        strength += PROXIMITY_WEIGHT;
    }

    strength += TEXT_SIMILARITY_WEIGHT * text_similarity(&a.entity().text, &b.entity().text);

    RelationshipAnalysis {
        strength: strength.min(1.0),
        relation_type,
    }
}

/// Attach relationships to every entity. Output order matches input order.
pub fn map_relationships(
    entities: Vec<EnrichedEntity>,
    config: &RelationshipConfig,
) -> Vec<RelatedEntity> {
    let pairs = if entities.len() > config.large_document_threshold {
        windowed_pairs(&entities, config.neighbor_window)
    } else {
        all_pairs(entities.len())
    };

    let mut co_occurrences: Vec<Vec<(usize, CoOccurrence)>> = vec![Vec::new(); entities.len()];
    let mut positional: Vec<Vec<(usize, PositionalLink)>> = vec![Vec::new(); entities.len()];
    let mut compared = 0usize;

    for (i, j) in pairs {
        compared += 1;
        let (a, b) = (&entities[i], &entities[j]);

        let analysis = analyze_relationship(a, b, config);
        if analysis.strength > config.cooccurrence_threshold {
            co_occurrences[i].push((j, cooccurrence_edge(b, &analysis)));
            co_occurrences[j].push((i, cooccurrence_edge(a, &analysis)));
        }

        let distance = offset_distance(a, b);
        if distance <= config.positional_distance {
            positional[i].push((j, positional_edge(b, distance)));
            positional[j].push((i, positional_edge(a, distance)));
        }
    }

    debug!(
        entities = entities.len(),
        pairs = compared,
        "Mapped entity relationships"
    );

    entities
        .into_iter()
        .zip(co_occurrences.into_iter().zip(positional))
        .map(|(enriched, (co, pos))| RelatedEntity {
            enriched,
            relationships: Relationships {
                co_occurrences: by_partner(co),
                semantic: Vec::new(),
                positional: by_partner(pos),
            },
        })
        .collect()
}

fn cooccurrence_edge(partner: &EnrichedEntity, analysis: &RelationshipAnalysis) -> CoOccurrence {
    CoOccurrence {
        entity_id: partner.entity().id.clone(),
        relation_type: analysis.relation_type,
        strength: analysis.strength,
    }
}

fn positional_edge(partner: &EnrichedEntity, distance: usize) -> PositionalLink {
    PositionalLink {
        entity_id: partner.entity().id.clone(),
        distance,
    }
}

fn by_partner<T>(mut edges: Vec<(usize, T)>) -> Vec<T> {
    edges.sort_by_key(|(partner, _)| *partner);
    edges.into_iter().map(|(_, edge)| edge).collect()
}

fn all_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

/// Pairs `(i, j)`, `i < j`, whose starting offsets are at most `window` apart.
fn windowed_pairs(entities: &[EnrichedEntity], window: usize) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..entities.len()).collect();
    order.sort_by_key(|&i| entities[i].entity().starting_pos);

    let mut pairs = Vec::new();
    for (k, &i) in order.iter().enumerate() {
        let start = entities[i].entity().starting_pos;
        for &j in &order[k + 1..] {
            if entities[j].entity().starting_pos - start > window {
                break;
            }
            pairs.push((i.min(j), i.max(j)));
        }
    }
    pairs
}
