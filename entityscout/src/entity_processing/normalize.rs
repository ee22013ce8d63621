//! Normalization of raw extraction output.

use super::scoring::clamp_unit;
use super::{NormalizedEntity, RawEntity};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Type label assigned when the service did not provide one.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Normalize one document's raw entities.
///
/// Output has one entry per input, in input order. Entities without an id get
/// a generated one; generated ids are unique within the call.
pub fn normalize_entities(raw_entities: &[RawEntity]) -> Vec<NormalizedEntity> {
    let now_ms = chrono::Utc::now().timestamp_millis();

    raw_entities
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_entity(raw, index, now_ms))
        .collect()
}

/// Normalize a single raw entity. `index` and `now_ms` seed the generated id.
pub fn normalize_entity(raw: &RawEntity, index: usize, now_ms: i64) -> NormalizedEntity {
    let id = match raw.identifier() {
        Some(id) => id.to_string(),
        None => generate_entity_id(raw, index, now_ms),
    };

    NormalizedEntity {
        id,
        text: raw.surface_text().to_string(),
        entity_type: raw
            .entity_type
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        relevance_score: clamp_unit(raw.relevance_score.unwrap_or(0.0)),
        confidence_score: clamp_unit(raw.confidence_score.unwrap_or(0.0)),
        dbpedia_score: clamp_unit(raw.dbpedia_score.unwrap_or(0.0)),
        freebase_score: clamp_unit(raw.freebase_score.unwrap_or(0.0)),
        wikipedia_link: raw.wikipedia_link.clone().filter(|l| !l.is_empty()),
        wiki_data_id: raw.wiki_data_id.clone().filter(|id| !id.is_empty()),
        starting_pos: to_offset(raw.starting_pos),
        ending_pos: to_offset(raw.ending_pos),
        raw_data: raw.clone(),
    }
}

/// Opaque id from text, type label, time and batch position, base64 encoded
/// with non-alphanumerics stripped.
fn generate_entity_id(raw: &RawEntity, index: usize, now_ms: i64) -> String {
    let seed = format!(
        "{}_{}_{}_{}",
        raw.surface_text(),
        raw.entity_type.as_deref().unwrap_or(""),
        now_ms,
        index
    );

    STANDARD
        .encode(seed.as_bytes())
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn to_offset(pos: Option<i64>) -> usize {
    pos.and_then(|p| usize::try_from(p).ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_defaults_for_missing_fields() {
        let entity = normalize_entity(&RawEntity::default(), 0, 1_700_000_000_000);

        assert!(!entity.id.is_empty());
        assert_eq!(entity.text, "");
        assert_eq!(entity.entity_type, UNKNOWN_TYPE);
        assert_eq!(entity.relevance_score, 0.0);
        assert_eq!(entity.confidence_score, 0.0);
        assert_eq!(entity.dbpedia_score, 0.0);
        assert_eq!(entity.freebase_score, 0.0);
        assert!(entity.wikipedia_link.is_none());
        assert!(entity.wiki_data_id.is_none());
        assert_eq!(entity.starting_pos, 0);
        assert_eq!(entity.ending_pos, 0);
    }

    #[test]
    fn test_scores_are_clamped() {
        let raw = RawEntity::new("Paris", "Location")
            .with_scores(7.5, -0.2)
            .with_link_scores(f64::NAN, 0.4);
        let entity = normalize_entity(&raw, 0, 0);

        assert_eq!(entity.relevance_score, 1.0);
        assert_eq!(entity.confidence_score, 0.0);
        assert_eq!(entity.dbpedia_score, 0.0);
        assert_eq!(entity.freebase_score, 0.4);
    }

    #[test]
    fn test_existing_id_is_kept() {
        let raw = RawEntity::new("Paris", "Location").with_id("Paris");
        assert_eq!(normalize_entity(&raw, 3, 0).id, "Paris");

        let blank = RawEntity::new("Paris", "Location").with_id("");
        assert_ne!(normalize_entity(&blank, 3, 0).id, "");
    }

    #[test]
    fn test_entity_id_is_fallback() {
        let raw = RawEntity {
            entity_id: Some("Paris".to_string()),
            ..RawEntity::new("Paris", "Location")
        };
        assert_eq!(normalize_entity(&raw, 0, 0).id, "Paris");

        let both = RawEntity {
            id: Some("12".to_string()),
            ..raw
        };
        assert_eq!(normalize_entity(&both, 0, 0).id, "12");
    }

    #[test]
    fn test_text_falls_back_to_text_field() {
        let raw = RawEntity {
            text: Some("Berlin".to_string()),
            ..RawEntity::default()
        };
        assert_eq!(normalize_entity(&raw, 0, 0).text, "Berlin");
    }

    #[test]
    fn test_negative_offsets_become_zero() {
        let raw = RawEntity::new("x", "y").with_span(-5, 12);
        let entity = normalize_entity(&raw, 0, 0);
        assert_eq!(entity.starting_pos, 0);
        assert_eq!(entity.ending_pos, 12);
    }

    #[test]
    fn test_generated_ids_are_alphanumeric_and_unique() {
        // Identical text and type in the same batch must still get distinct ids.
        let raw: Vec<RawEntity> = (0..50)
            .map(|_| RawEntity::new("Apple", "Organization"))
            .collect();
        let entities = normalize_entities(&raw);

        assert_eq!(entities.len(), raw.len());
        let ids: HashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), raw.len());
        assert!(
            entities
                .iter()
                .all(|e| e.id.chars().all(|c| c.is_ascii_alphanumeric()))
        );
    }

    #[test]
    fn test_raw_payload_is_retained() {
        let raw = RawEntity::new("Apple", "Organization").with_wiki_data_id("Q312");
        let entity = normalize_entity(&raw, 0, 0);
        assert_eq!(entity.raw_data, raw);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_entities(&[]).is_empty());
    }
}
