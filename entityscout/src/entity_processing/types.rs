//! Entity records at each stage of the processing pipeline.

use serde::{Deserialize, Serialize};

/// Entity as returned by the extraction service, before normalization.
///
/// Deserialization is lenient: scores and offsets may arrive as numbers or as
/// numeric strings, `type` may be a string or a list of type labels, and the
/// TextRazor field names (`wikiLink`, `wikidataId`) are accepted alongside the
/// canonical ones. Anything unparseable is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntity {
    /// Service-assigned id, a string or a number. `0` and `""` count as absent.
    #[serde(default, deserialize_with = "lenient::identifier", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Knowledge-base entity name, used when `id` is absent.
    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,

    #[serde(default, deserialize_with = "lenient::string", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient::type_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub entity_type: Option<String>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub dbpedia_score: Option<f64>,

    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub freebase_score: Option<f64>,

    #[serde(
        default,
        alias = "wikiLink",
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub wikipedia_link: Option<String>,

    #[serde(
        default,
        alias = "wikidataId",
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub wiki_data_id: Option<String>,

    #[serde(default, deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub starting_pos: Option<i64>,

    #[serde(default, deserialize_with = "lenient::integer", skip_serializing_if = "Option::is_none")]
    pub ending_pos: Option<i64>,
}

impl RawEntity {
    /// Create a raw entity with just a surface form and a type label.
    pub fn new(text: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            matched_text: Some(text.into()),
            entity_type: Some(entity_type.into()),
            ..Self::default()
        }
    }

    /// Set the character span.
    pub fn with_span(mut self, start: i64, end: i64) -> Self {
        self.starting_pos = Some(start);
        self.ending_pos = Some(end);
        self
    }

    /// Set the service-reported relevance and confidence.
    pub fn with_scores(mut self, relevance: f64, confidence: f64) -> Self {
        self.relevance_score = Some(relevance);
        self.confidence_score = Some(confidence);
        self
    }

    /// Set the knowledge-base link scores.
    pub fn with_link_scores(mut self, dbpedia: f64, freebase: f64) -> Self {
        self.dbpedia_score = Some(dbpedia);
        self.freebase_score = Some(freebase);
        self
    }

    /// Set the Wikipedia link.
    pub fn with_wikipedia_link(mut self, link: impl Into<String>) -> Self {
        self.wikipedia_link = Some(link.into());
        self
    }

    /// Set the Wikidata id.
    pub fn with_wiki_data_id(mut self, id: impl Into<String>) -> Self {
        self.wiki_data_id = Some(id.into());
        self
    }

    /// Set an explicit identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Identifier to keep: `id`, falling back to `entityId`.
    pub fn identifier(&self) -> Option<&str> {
        non_empty(self.id.as_deref()).or_else(|| non_empty(self.entity_id.as_deref()))
    }

    /// Surface form: `matchedText`, falling back to `text`.
    pub fn surface_text(&self) -> &str {
        non_empty(self.matched_text.as_deref())
            .or_else(|| non_empty(self.text.as_deref()))
            .unwrap_or("")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A raw entity with a stable id, defaulted fields and scores clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEntity {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub relevance_score: f64,
    pub confidence_score: f64,
    pub dbpedia_score: f64,
    pub freebase_score: f64,
    pub wikipedia_link: Option<String>,
    pub wiki_data_id: Option<String>,
    pub starting_pos: usize,
    pub ending_pos: usize,
    /// The payload this entity was normalized from
    pub raw_data: RawEntity,
}

/// A normalized entity with its weighted confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredEntity {
    #[serde(flatten)]
    pub entity: NormalizedEntity,
    pub calculated_confidence: f64,
}

/// Summary returned by the encyclopedia lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikipediaSummary {
    pub extract: String,
    pub thumbnail: Option<String>,
    pub page_id: u64,
    pub categories: Vec<String>,
}

/// A scored entity with whatever the encyclopedia lookup produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedEntity {
    #[serde(flatten)]
    pub scored: ScoredEntity,
    pub wikipedia_data: Option<WikipediaSummary>,
    pub description: Option<String>,
    pub categories: Vec<String>,
}

impl EnrichedEntity {
    /// Attach lookup results (or their absence) to a scored entity.
    pub fn new(scored: ScoredEntity, summary: Option<WikipediaSummary>) -> Self {
        let description = summary
            .as_ref()
            .map(|s| s.extract.clone())
            .filter(|extract| !extract.is_empty());
        let categories = summary
            .as_ref()
            .map(|s| s.categories.clone())
            .unwrap_or_default();

        Self {
            scored,
            wikipedia_data: summary,
            description,
            categories,
        }
    }

    /// Wrap a scored entity that was never looked up.
    pub fn unenriched(scored: ScoredEntity) -> Self {
        Self::new(scored, None)
    }

    pub fn entity(&self) -> &NormalizedEntity {
        &self.scored.entity
    }
}

/// Label attached to a co-occurrence edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Entities merely appear in the same document
    Cooccurrence,
    /// Entities share a type label
    SameType,
    /// Entities share at least one encyclopedia category
    Semantic,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Cooccurrence => "cooccurrence",
            RelationType::SameType => "same_type",
            RelationType::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted, typed edge to another entity of the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoOccurrence {
    pub entity_id: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub strength: f64,
}

/// Character-offset distance to a nearby entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalLink {
    pub entity_id: String,
    pub distance: usize,
}

/// Edges attached to one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationships {
    pub co_occurrences: Vec<CoOccurrence>,
    /// Reserved; nothing populates it yet
    pub semantic: Vec<CoOccurrence>,
    pub positional: Vec<PositionalLink>,
}

/// Final pipeline output: an enriched entity plus its relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntity {
    #[serde(flatten)]
    pub enriched: EnrichedEntity,
    pub relationships: Relationships,
}

impl RelatedEntity {
    pub fn entity(&self) -> &NormalizedEntity {
        self.enriched.entity()
    }

    pub fn id(&self) -> &str {
        &self.entity().id
    }

    pub fn text(&self) -> &str {
        &self.entity().text
    }

    pub fn entity_type(&self) -> &str {
        &self.entity().entity_type
    }

    pub fn calculated_confidence(&self) -> f64 {
        self.enriched.scored.calculated_confidence
    }

    pub fn description(&self) -> Option<&str> {
        self.enriched.description.as_deref()
    }

    pub fn categories(&self) -> &[String] {
        &self.enriched.categories
    }

    pub fn wikipedia_link(&self) -> Option<&str> {
        self.entity().wikipedia_link.as_deref()
    }
}

mod lenient {
    //! Forgiving deserializers for extraction payloads.

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(as_f64))
    }

    pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(|v| match v {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            }
            _ => None,
        }))
    }

    /// A string field; any other JSON type is treated as absent.
    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            _ => None,
        })
    }

    /// An id given as a string or a number. Zero and empty strings are absent.
    pub fn identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        })
    }

    /// A type label given either as a string or as a list (first entry wins).
    pub fn type_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => Some(s),
            Some(Value::Array(items)) => items
                .into_iter()
                .find_map(|item| item.as_str().map(str::to_string)),
            _ => None,
        })
    }

    fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|f| f.is_finite())
    }
}
