//! Weighted confidence scoring.
//!
//! The base score is a weighted average over the four service-reported
//! channels. A channel whose value is zero counts as unscored and is dropped
//! from both the numerator and the weight total, so an entity that lacks
//! knowledge-base scores is graded on what it has. The base is then scaled by
//! a presence bonus and capped at 1.

use super::NormalizedEntity;

pub const RELEVANCE_WEIGHT: f64 = 0.3;
pub const CONFIDENCE_WEIGHT: f64 = 0.4;
pub const DBPEDIA_WEIGHT: f64 = 0.2;
pub const FREEBASE_WEIGHT: f64 = 0.1;

pub const WIKIPEDIA_LINK_BONUS: f64 = 0.10;
pub const WIKIDATA_ID_BONUS: f64 = 0.05;
pub const MULTI_CHAR_TEXT_BONUS: f64 = 0.05;

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Weighted average over the channels that carry a score.
pub fn base_score(entity: &NormalizedEntity) -> f64 {
    let channels = [
        (entity.relevance_score, RELEVANCE_WEIGHT),
        (entity.confidence_score, CONFIDENCE_WEIGHT),
        (entity.dbpedia_score, DBPEDIA_WEIGHT),
        (entity.freebase_score, FREEBASE_WEIGHT),
    ];

    let (weighted, total_weight) = channels
        .iter()
        .map(|&(value, weight)| (clamp_unit(value), weight))
        .filter(|&(value, _)| value > 0.0)
        .fold((0.0, 0.0), |(sum, total), (value, weight)| {
            (sum + value * weight, total + weight)
        });

    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    }
}

/// `1 + ` the bonuses that apply to this entity.
pub fn bonus_multiplier(entity: &NormalizedEntity) -> f64 {
    let mut multiplier = 1.0;
    if entity.wikipedia_link.is_some() {
        multiplier += WIKIPEDIA_LINK_BONUS;
    }
    if entity.wiki_data_id.is_some() {
        multiplier += WIKIDATA_ID_BONUS;
    }
    if entity.text.chars().count() > 1 {
        multiplier += MULTI_CHAR_TEXT_BONUS;
    }
    multiplier
}

/// Final confidence in `[0, 1]`.
pub fn calculate_confidence(entity: &NormalizedEntity) -> f64 {
    (base_score(entity) * bonus_multiplier(entity)).min(1.0)
}
