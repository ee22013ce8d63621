//! Wikipedia enrichment with a per-link single-flight cache.
//!
//! Every distinct link is resolved at most once per cache lifetime. Concurrent
//! requests for the same uncached link wait on one shared lookup instead of
//! each passing the rate check and issuing their own call. A link whose lookup
//! was rejected by the rate limiter or failed is cached as `None` and is not
//! retried until the cache is cleared.

use super::rate_limit::RateLimitWindow;
use super::{EnrichedEntity, ScoredEntity, WikipediaSummary};
use crate::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Encyclopedia lookup keyed by a Wikipedia link.
///
/// `Ok(None)` means the page does not exist or the link carries no title.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummaryLookup: Send + Sync {
    async fn fetch_summary(&self, link: &str) -> Result<Option<WikipediaSummary>>;
}

type Slot = Arc<OnceCell<Option<WikipediaSummary>>>;

/// Link → lookup result. `Some(None)` from [`EnrichmentCache::get`] records an
/// attempt that produced nothing; `None` means the link was never attempted.
#[derive(Debug, Default)]
pub struct EnrichmentCache {
    entries: Mutex<HashMap<String, Slot>>,
}

impl EnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, link: &str) -> Slot {
        self.entries()
            .entry(link.to_string())
            .or_default()
            .clone()
    }

    /// Settled result for a link, if an attempt has completed.
    pub fn get(&self, link: &str) -> Option<Option<WikipediaSummary>> {
        self.entries().get(link).and_then(|slot| slot.get().cloned())
    }

    /// Record a result directly. Ignored if the link is already settled.
    pub fn insert(&self, link: &str, summary: Option<WikipediaSummary>) {
        let _ = self.slot(link).set(summary);
    }

    /// Return the cached result for `link`, running `fetch` if nobody has.
    ///
    /// Callers that arrive while a fetch for the same link is in flight wait
    /// for it and receive its result.
    pub async fn get_or_fetch<F, Fut>(&self, link: &str, fetch: F) -> Option<WikipediaSummary>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<WikipediaSummary>>,
    {
        let slot = self.slot(link);
        slot.get_or_init(fetch).await.clone()
    }

    /// Number of links with a settled result.
    pub fn len(&self) -> usize {
        self.entries()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

/// Fans lookups out over a document's entities behind a shared rate window.
pub struct Enricher {
    lookup: Arc<dyn SummaryLookup>,
    cache: EnrichmentCache,
    limiter: Mutex<RateLimitWindow>,
    enabled: bool,
}

impl std::fmt::Debug for Enricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enricher")
            .field("cache", &self.cache.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Enricher {
    pub fn new(lookup: Arc<dyn SummaryLookup>, limiter: RateLimitWindow, enabled: bool) -> Self {
        Self {
            lookup,
            cache: EnrichmentCache::new(),
            limiter: Mutex::new(limiter),
            enabled,
        }
    }

    pub fn cache(&self) -> &EnrichmentCache {
        &self.cache
    }

    /// Enrich all entities concurrently; output order matches input order.
    ///
    /// Never fails: entities whose lookup is skipped or fails come back without
    /// a description or categories.
    pub async fn enrich(&self, entities: Vec<ScoredEntity>) -> Vec<EnrichedEntity> {
        let tasks = entities.into_iter().map(|scored| async move {
            let summary = match scored.entity.wikipedia_link.as_deref() {
                Some(link) => self.resolve(link, &scored.entity.text).await,
                None => None,
            };
            EnrichedEntity::new(scored, summary)
        });

        let enriched = join_all(tasks).await;
        debug!(
            entities = enriched.len(),
            described = enriched.iter().filter(|e| e.description.is_some()).count(),
            "Enrichment complete"
        );
        enriched
    }

    async fn resolve(&self, link: &str, entity_text: &str) -> Option<WikipediaSummary> {
        if !self.enabled {
            return self.cache.get(link).flatten();
        }

        self.cache
            .get_or_fetch(link, || async {
                if !self.admit() {
                    warn!(
                        entity = entity_text,
                        link, "Rate limit exceeded, skipping Wikipedia enrichment"
                    );
                    return None;
                }

                match self.lookup.fetch_summary(link).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        warn!(
                            entity = entity_text,
                            link,
                            error = %e,
                            "Failed to fetch Wikipedia data"
                        );
                        None
                    }
                }
            })
            .await
    }

    fn admit(&self) -> bool {
        self.limiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_acquire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityScoutError;
    use crate::entity_processing::normalize::normalize_entity;
    use crate::entity_processing::{RawEntity, ScoredEntity};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const APPLE: &str = "https://en.wikipedia.org/wiki/Apple_Inc.";

    fn scored(text: &str, link: Option<&str>) -> ScoredEntity {
        let mut raw = RawEntity::new(text, "Organization");
        raw.wikipedia_link = link.map(str::to_string);
        ScoredEntity {
            entity: normalize_entity(&raw, 0, 0),
            calculated_confidence: 0.5,
        }
    }

    fn summary(extract: &str) -> WikipediaSummary {
        WikipediaSummary {
            extract: extract.to_string(),
            thumbnail: None,
            page_id: 856,
            categories: vec!["Technology companies".to_string()],
        }
    }

    fn window(max: u32) -> RateLimitWindow {
        RateLimitWindow::new(max, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_enrich_attaches_summary() {
        let mut lookup = MockSummaryLookup::new();
        lookup
            .expect_fetch_summary()
            .times(1)
            .returning(|_| Ok(Some(summary("Apple Inc. is a technology company."))));

        let enricher = Enricher::new(Arc::new(lookup), window(50), true);
        let out = enricher
            .enrich(vec![scored("Apple", Some(APPLE)), scored("Tim Cook", None)])
            .await;

        assert_eq!(out.len(), 2);
        assert_eq!(
            out[0].description.as_deref(),
            Some("Apple Inc. is a technology company.")
        );
        assert_eq!(out[0].categories, vec!["Technology companies".to_string()]);
        assert!(out[0].wikipedia_data.is_some());
        assert!(out[1].description.is_none());
        assert!(out[1].categories.is_empty());
    }

    #[tokio::test]
    async fn test_second_pass_uses_cache() {
        let mut lookup = MockSummaryLookup::new();
        lookup
            .expect_fetch_summary()
            .times(1)
            .returning(|_| Ok(Some(summary("cached"))));

        let enricher = Enricher::new(Arc::new(lookup), window(50), true);
        enricher.enrich(vec![scored("Apple", Some(APPLE))]).await;
        let second = enricher.enrich(vec![scored("Apple", Some(APPLE))]).await;

        assert_eq!(second[0].description.as_deref(), Some("cached"));
        assert_eq!(enricher.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_cached_as_none() {
        let mut lookup = MockSummaryLookup::new();
        lookup
            .expect_fetch_summary()
            .times(1)
            .returning(|_| Err(EntityScoutError::Lookup("HTTP 500".to_string())));

        let enricher = Enricher::new(Arc::new(lookup), window(50), true);
        let first = enricher.enrich(vec![scored("Apple", Some(APPLE))]).await;
        let second = enricher.enrich(vec![scored("Apple", Some(APPLE))]).await;

        assert!(first[0].description.is_none());
        assert!(second[0].description.is_none());
        assert_eq!(enricher.cache().get(APPLE), Some(None));
    }

    #[tokio::test]
    async fn test_rate_limited_links_are_skipped() {
        let mut lookup = MockSummaryLookup::new();
        lookup
            .expect_fetch_summary()
            .times(1)
            .returning(|_| Ok(Some(summary("first"))));

        let enricher = Enricher::new(Arc::new(lookup), window(1), true);
        let out = enricher
            .enrich(vec![
                scored("A", Some("https://en.wikipedia.org/wiki/A")),
                scored("B", Some("https://en.wikipedia.org/wiki/B")),
            ])
            .await;

        let described = out.iter().filter(|e| e.description.is_some()).count();
        assert_eq!(described, 1);
        assert_eq!(enricher.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_enricher_never_looks_up() {
        let mut lookup = MockSummaryLookup::new();
        lookup.expect_fetch_summary().times(0);

        let enricher = Enricher::new(Arc::new(lookup), window(50), false);
        let out = enricher.enrich(vec![scored("Apple", Some(APPLE))]).await;

        assert!(out[0].description.is_none());
        assert!(enricher.cache().is_empty());
    }

    /// Lookup that yields before answering, so concurrent callers overlap.
    struct SlowLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SummaryLookup for SlowLookup {
        async fn fetch_summary(&self, _link: &str) -> Result<Option<WikipediaSummary>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(Some(summary("shared")))
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_lookup() {
        let lookup = Arc::new(SlowLookup {
            calls: AtomicUsize::new(0),
        });
        let enricher = Enricher::new(lookup.clone(), window(50), true);

        let entities = (0..8).map(|_| scored("Apple", Some(APPLE))).collect();
        let out = enricher.enrich(entities).await;

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert!(
            out.iter()
                .all(|e| e.description.as_deref() == Some("shared"))
        );
        // Only one rate-limit admission was spent.
        assert_eq!(enricher.limiter.lock().unwrap().remaining(), 49);
    }

    #[tokio::test]
    async fn test_cache_clear() {
        let cache = EnrichmentCache::new();
        cache.insert(APPLE, Some(summary("x")));
        cache.insert("https://en.wikipedia.org/wiki/Missing", None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("https://en.wikipedia.org/wiki/Unknown"), None);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(APPLE), None);
    }
}
