//! Where raw entities come from.

use super::RawEntity;
use crate::{EntityScoutError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Extraction service that turns document text into raw entities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntitySource: Send + Sync {
    async fn extract(&self, text: &str) -> Result<Vec<RawEntity>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EntityDocument {
    List(Vec<RawEntity>),
    Envelope { response: EnvelopeBody },
}

#[derive(Deserialize)]
struct EnvelopeBody {
    #[serde(default)]
    entities: Vec<RawEntity>,
}

/// Parse raw entities from JSON: either a bare array or a TextRazor response
/// envelope `{"response": {"entities": [...]}}`.
pub fn parse_raw_entities(json: &str) -> Result<Vec<RawEntity>> {
    let document: EntityDocument = serde_json::from_str(json).map_err(|e| {
        EntityScoutError::Serialization(format!(
            "Expected an entity array or a response envelope: {}",
            e
        ))
    })?;

    Ok(match document {
        EntityDocument::List(entities) => entities,
        EntityDocument::Envelope { response } => response.entities,
    })
}

/// Raw entities saved to disk by an earlier extraction.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<RawEntity>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            EntityScoutError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        parse_raw_entities(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array() {
        let entities = parse_raw_entities(
            r#"[
                {"matchedText": "Apple", "type": "Organization", "relevanceScore": "0.9"},
                {"text": "Cupertino", "type": ["Place", "City"], "startingPos": 42}
            ]"#,
        )
        .unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].relevance_score, Some(0.9));
        assert_eq!(entities[1].surface_text(), "Cupertino");
        assert_eq!(entities[1].entity_type.as_deref(), Some("Place"));
        assert_eq!(entities[1].starting_pos, Some(42));
    }

    #[test]
    fn test_parse_envelope() {
        let entities = parse_raw_entities(
            r#"{"response": {"language": "eng", "entities": [
                {"id": 0, "entityId": "Apple Inc.", "matchedText": "Apple",
                 "wikiLink": "http://en.wikipedia.org/wiki/Apple_Inc.", "wikidataId": "Q312"}
            ]}}"#,
        )
        .unwrap();

        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, None);
        assert_eq!(entities[0].identifier(), Some("Apple Inc."));
        assert_eq!(entities[0].wiki_data_id.as_deref(), Some("Q312"));

        let empty = parse_raw_entities(r#"{"response": {}}"#).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_tolerates_mistyped_fields() {
        let entities = parse_raw_entities(
            r#"[
                {"id": 7, "matchedText": "Apple", "type": "Company"},
                {"id": "", "matchedText": 42, "text": "Cupertino", "wikiLink": false,
                 "wikidataId": ["Q4120"], "entityId": null}
            ]"#,
        )
        .unwrap();

        assert_eq!(entities[0].identifier(), Some("7"));
        assert_eq!(entities[1].id, None);
        assert_eq!(entities[1].identifier(), None);
        assert_eq!(entities[1].matched_text, None);
        assert_eq!(entities[1].surface_text(), "Cupertino");
        assert_eq!(entities[1].wikipedia_link, None);
        assert_eq!(entities[1].wiki_data_id, None);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(matches!(
            parse_raw_entities(r#"{"entities": "nope"}"#),
            Err(EntityScoutError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.json");
        std::fs::write(&path, r#"[{"matchedText": "Paris", "type": "City"}]"#).unwrap();

        let entities = JsonFileSource::new(&path).load().await.unwrap();
        assert_eq!(entities[0].surface_text(), "Paris");

        let missing = JsonFileSource::new(dir.path().join("missing.json")).load().await;
        assert!(matches!(missing, Err(EntityScoutError::Io(_))));
    }
}
