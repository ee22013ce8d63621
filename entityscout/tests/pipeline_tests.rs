//! End-to-end tests for the entity processing pipeline
//!
//! Tests cover:
//! - Text similarity and pairwise relationship mapping
//! - Large-document windowing
//! - Enrichment caching and failure handling
//! - Lenient parsing of extraction payloads

use async_trait::async_trait;
use entityscout::config::{ConfigBuilder, EntityScoutConfig};
use entityscout::entity_processing::*;
use entityscout::{EntityScoutError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts calls; answers every link with the same summary unless failing.
#[derive(Default)]
struct CountingLookup {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingLookup {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummaryLookup for CountingLookup {
    async fn fetch_summary(&self, link: &str) -> Result<Option<WikipediaSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EntityScoutError::Lookup("HTTP 503".to_string()));
        }
        Ok(Some(WikipediaSummary {
            extract: format!("About {}", link),
            thumbnail: None,
            page_id: 42,
            categories: vec!["Companies".to_string()],
        }))
    }
}

fn config() -> EntityScoutConfig {
    ConfigBuilder::testing().with_enrichment_enabled(true).build().unwrap()
}

fn processor(lookup: Arc<CountingLookup>) -> EntityProcessor {
    EntityProcessor::new(config(), lookup)
}

#[cfg(test)]
mod relationship_tests {
    use super::*;

    #[test]
    fn test_text_similarity_examples() {
        assert_eq!(text_similarity("Apple Inc", "Apple Inc"), 1.0);
        assert_eq!(text_similarity("Apple", "Apple Inc"), 0.7);
        assert_eq!(text_similarity("Apple Inc", "Microsoft Corp"), 0.0);
    }

    #[tokio::test]
    async fn test_ten_entity_document() {
        let types = [
            "Person", "Organization", "Organization", "Place", "Date", "Event", "Product",
            "Work", "Language", "Money",
        ];
        let texts = [
            "Alice", "Apple", "Google", "Paris", "Monday", "Olympics", "iPhone", "Hamlet",
            "French", "Dollar",
        ];
        let raw: Vec<RawEntity> = (0..10)
            .map(|i| {
                let start = if i == 2 { 1010 } else { i as i64 * 1000 };
                RawEntity::new(texts[i], types[i])
                    .with_id(format!("e{}", i))
                    .with_span(start, start + texts[i].len() as i64)
                    .with_scores(0.6, 0.7)
            })
            .collect();

        let entities = processor(Arc::new(CountingLookup::default()))
            .process_entities(raw)
            .await;
        assert_eq!(entities.len(), 10);

        let one = &entities[1].relationships;
        let two = &entities[2].relationships;

        assert_eq!(one.co_occurrences.len(), 1);
        assert_eq!(one.co_occurrences[0].entity_id, "e2");
        assert_eq!(one.co_occurrences[0].relation_type, RelationType::SameType);
        assert_eq!(two.co_occurrences.len(), 1);
        assert_eq!(two.co_occurrences[0].entity_id, "e1");
        assert_eq!(two.co_occurrences[0].relation_type, RelationType::SameType);
        assert_eq!(one.co_occurrences[0].strength, two.co_occurrences[0].strength);

        assert_eq!(one.positional.len(), 1);
        assert_eq!(one.positional[0].entity_id, "e2");
        assert_eq!(one.positional[0].distance, 10);
        assert_eq!(two.positional[0].entity_id, "e1");
        assert_eq!(two.positional[0].distance, 10);

        for (i, entity) in entities.iter().enumerate() {
            if i != 1 && i != 2 {
                assert!(entity.relationships.co_occurrences.is_empty());
                assert!(entity.relationships.positional.is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_six_hundred_entity_document() {
        // Offsets 13 apart, visited out of input order.
        let raw: Vec<RawEntity> = (0..600)
            .map(|i| {
                let start = ((i * 37) % 600) as i64 * 13;
                RawEntity::new(format!("Entity {}", i % 7), format!("Type{}", i % 3))
                    .with_id(format!("e{}", i))
                    .with_span(start, start + 8)
                    .with_scores(0.5, 0.5)
            })
            .collect();

        let offsets: HashMap<String, usize> = raw
            .iter()
            .map(|r| (r.id.clone().unwrap(), r.starting_pos.unwrap() as usize))
            .collect();

        let entities = processor(Arc::new(CountingLookup::default()))
            .process_entities(raw)
            .await;
        assert_eq!(entities.len(), 600);

        let mut edges = 0;
        for entity in &entities {
            let own = offsets[entity.id()];
            for edge in &entity.relationships.co_occurrences {
                assert!(own.abs_diff(offsets[&edge.entity_id]) <= 200);
                edges += 1;
            }
            for edge in &entity.relationships.positional {
                assert!(own.abs_diff(offsets[&edge.entity_id]) <= 100);
                assert_eq!(edge.distance, own.abs_diff(offsets[&edge.entity_id]));
            }
        }
        assert!(edges > 0);

        // Large documents keep mirrored edges.
        let by_id: HashMap<&str, &RelatedEntity> =
            entities.iter().map(|e| (e.id(), e)).collect();
        for entity in &entities {
            for edge in &entity.relationships.co_occurrences {
                let partner = by_id[edge.entity_id.as_str()];
                assert!(
                    partner
                        .relationships
                        .co_occurrences
                        .iter()
                        .any(|back| back.entity_id == entity.id())
                );
            }
        }
    }
}

#[cfg(test)]
mod enrichment_tests {
    use super::*;

    fn linked(text: &str, link: &str) -> RawEntity {
        RawEntity::new(text, "Organization")
            .with_scores(0.8, 0.8)
            .with_wikipedia_link(link)
    }

    #[tokio::test]
    async fn test_enrich_twice_issues_one_lookup() {
        let lookup = Arc::new(CountingLookup::default());
        let processor = processor(lookup.clone());
        let link = "https://en.wikipedia.org/wiki/Apple_Inc.";

        let scored = processor.score(processor.normalize(&[linked("Apple", link)]));
        let first = processor.enrich(scored.clone()).await;
        let second = processor.enrich(scored).await;

        assert_eq!(lookup.calls(), 1);
        assert_eq!(first[0].description, second[0].description);
        assert_eq!(processor.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_shared_link_is_fetched_once() {
        let lookup = Arc::new(CountingLookup::default());
        let link = "https://en.wikipedia.org/wiki/Apple_Inc.";
        let raw = vec![
            linked("Apple", link),
            linked("Apple Inc.", link),
            linked("AAPL", link),
        ];

        let entities = processor(lookup.clone()).process_entities(raw).await;

        assert_eq!(lookup.calls(), 1);
        assert!(entities.iter().all(|e| e.description().is_some()));
        assert!(entities.iter().all(|e| e.categories() == ["Companies"]));
    }

    #[tokio::test]
    async fn test_failing_lookup_keeps_entities() {
        let lookup = Arc::new(CountingLookup::failing());
        let raw = vec![
            linked("Apple", "https://en.wikipedia.org/wiki/Apple_Inc."),
            linked("Google", "https://en.wikipedia.org/wiki/Google"),
        ];

        let entities = processor(lookup.clone()).process_entities(raw).await;

        assert_eq!(entities.len(), 2);
        assert_eq!(lookup.calls(), 2);
        assert!(entities.iter().all(|e| e.description().is_none()));
        assert!(entities.iter().all(|e| e.enriched.wikipedia_data.is_none()));
    }

    #[tokio::test]
    async fn test_rate_limit_caps_lookups() {
        let lookup = Arc::new(CountingLookup::default());
        let config = ConfigBuilder::testing()
            .with_enrichment_enabled(true)
            .with_rate_limit(2, 60_000)
            .build()
            .unwrap();
        let processor = EntityProcessor::new(config, lookup.clone());

        let raw: Vec<RawEntity> = (0..5)
            .map(|i| linked(&format!("Org {}", i), &format!("https://en.wikipedia.org/wiki/Org_{}", i)))
            .collect();
        let entities = processor.process_entities(raw).await;

        assert_eq!(lookup.calls(), 2);
        assert_eq!(entities.iter().filter(|e| e.description().is_some()).count(), 2);
        // Rejected links are remembered as attempted.
        assert_eq!(processor.cache_size(), 5);
    }
}

#[cfg(test)]
mod parsing_tests {
    use super::*;

    #[tokio::test]
    async fn test_lenient_extraction_payload() {
        let raw = parse_raw_entities(
            r#"{"response": {"entities": [
                {"id": 0, "entityId": "Barack_Obama", "matchedText": "Obama", "type": ["Person", "Agent"],
                 "relevanceScore": "0.75", "confidenceScore": 4.2, "startingPos": "12",
                 "endingPos": 17, "wikiLink": "https://en.wikipedia.org/wiki/Barack_Obama"},
                {"text": "Hawaii", "relevanceScore": null, "confidenceScore": "high",
                 "startingPos": -3},
                {}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(raw.len(), 3);

        let processor = EntityProcessor::new(
            ConfigBuilder::testing().build().unwrap(),
            Arc::new(CountingLookup::default()),
        );
        let entities = processor.normalize(&raw);

        assert_eq!(entities[0].id, "Barack_Obama");
        assert_eq!(entities[0].entity_type, "Person");
        assert_eq!(entities[0].relevance_score, 0.75);
        assert_eq!(entities[0].confidence_score, 1.0);
        assert_eq!(entities[0].starting_pos, 12);

        assert_eq!(entities[1].text, "Hawaii");
        assert_eq!(entities[1].entity_type, "Unknown");
        assert_eq!(entities[1].confidence_score, 0.0);
        assert_eq!(entities[1].starting_pos, 0);

        assert_eq!(entities[2].text, "");
        assert!(!entities[2].id.is_empty());
        assert_ne!(entities[1].id, entities[2].id);
    }

    #[tokio::test]
    async fn test_disabled_enrichment_skips_lookups() {
        let lookup = Arc::new(CountingLookup::default());
        let processor = EntityProcessor::new(ConfigBuilder::testing().build().unwrap(), lookup.clone());

        let raw = vec![
            RawEntity::new("Apple", "Organization")
                .with_scores(0.9, 0.9)
                .with_wikipedia_link("https://en.wikipedia.org/wiki/Apple_Inc."),
        ];
        let entities = processor.process_entities(raw).await;

        assert_eq!(entities.len(), 1);
        assert_eq!(lookup.calls(), 0);
        assert!(entities[0].description().is_none());
    }
}
