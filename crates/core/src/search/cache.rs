use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use voyage_site_query::ContentQueryService;

use super::entry::{EntrySnapshot, FetchStatus, SearchEntry};
use super::queries;

/// Session-scoped cache of search-support content.
///
/// Each entry is fetched at most once successfully; nothing is refreshed
/// until [`clear_search_data`](Self::clear_search_data). The two singleton
/// entries succeed with no value when their document is missing, and are
/// queried again on the next call.
#[derive(Debug)]
pub struct SearchDataCache {
    content: ContentQueryService,
    destinations: SearchEntry<Vec<Value>>,
    regions: SearchEntry<Vec<Value>>,
    search_field_content: SearchEntry<Option<Value>>,
    content_text: SearchEntry<Option<Value>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDataSnapshot {
    pub destinations: EntrySnapshot<Vec<Value>>,
    pub regions: EntrySnapshot<Vec<Value>>,
    pub search_field_content: EntrySnapshot<Option<Value>>,
    pub content_text: EntrySnapshot<Option<Value>>,
}

impl SearchDataCache {
    pub fn new(content: ContentQueryService) -> Self {
        Self {
            content,
            destinations: SearchEntry::new("search-destinations"),
            regions: SearchEntry::new("search-regions"),
            search_field_content: SearchEntry::new("search-field-content"),
            content_text: SearchEntry::new("search-content-text"),
        }
    }

    pub async fn fetch_destinations(&self) -> Option<Arc<Vec<Value>>> {
        self.destinations
            .fetch_with(|| queries::destinations(&self.content))
            .await
    }

    pub async fn fetch_regions(&self) -> Option<Arc<Vec<Value>>> {
        self.regions
            .fetch_with(|| queries::regions(&self.content))
            .await
    }

    pub async fn fetch_search_field_content(&self) -> Option<Value> {
        self.search_field_content
            .fetch_optional_with(|| queries::search_field_content(&self.content))
            .await
            .and_then(|doc| (*doc).clone())
    }

    pub async fn fetch_content_text(&self) -> Option<Value> {
        self.content_text
            .fetch_optional_with(|| queries::content_text(&self.content))
            .await
            .and_then(|doc| (*doc).clone())
    }

    /// Fetch all four entries concurrently.
    pub async fn initialize_search_data(&self) {
        tokio::join!(
            self.fetch_destinations(),
            self.fetch_regions(),
            self.fetch_search_field_content(),
            self.fetch_content_text(),
        );
    }

    /// Drop every cached value and return all entries to `Idle`.
    pub fn clear_search_data(&self) {
        self.destinations.reset();
        self.regions.reset();
        self.search_field_content.reset();
        self.content_text.reset();
    }

    pub fn destinations(&self) -> Option<Arc<Vec<Value>>> {
        self.destinations.value()
    }

    pub fn regions(&self) -> Option<Arc<Vec<Value>>> {
        self.regions.value()
    }

    pub fn search_field_content(&self) -> Option<Value> {
        self.search_field_content.value().and_then(|doc| (*doc).clone())
    }

    pub fn content_text(&self) -> Option<Value> {
        self.content_text.value().and_then(|doc| (*doc).clone())
    }

    pub fn destinations_status(&self) -> FetchStatus {
        self.destinations.status()
    }

    pub fn regions_status(&self) -> FetchStatus {
        self.regions.status()
    }

    pub fn search_field_content_status(&self) -> FetchStatus {
        self.search_field_content.status()
    }

    pub fn content_text_status(&self) -> FetchStatus {
        self.content_text.status()
    }

    pub fn snapshot(&self) -> SearchDataSnapshot {
        SearchDataSnapshot {
            destinations: self.destinations.snapshot(),
            regions: self.regions.snapshot(),
            search_field_content: self.search_field_content.snapshot(),
            content_text: self.content_text.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use voyage_site_query::{ContentSource, MemoryContentSource, QueryError};

    /// Wraps a memory source, counting calls per collection and optionally
    /// failing every call.
    struct CountingSource {
        inner: MemoryContentSource,
        fail: AtomicBool,
        calls: parking_lot::Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
    }

    impl CountingSource {
        fn new(inner: MemoryContentSource) -> Arc<Self> {
            Arc::new(Self {
                inner,
                fail: AtomicBool::new(false),
                calls: parking_lot::Mutex::new(HashMap::new()),
                total: AtomicUsize::new(0),
            })
        }

        fn calls(&self, collection: &str) -> usize {
            self.calls.lock().get(collection).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl ContentSource for CountingSource {
        async fn documents(&self, collection: &str) -> Result<Vec<Value>, QueryError> {
            *self.calls.lock().entry(collection.to_string()).or_default() += 1;
            self.total.fetch_add(1, Ordering::SeqCst);
            // Suspend like a real round-trip so concurrent callers interleave.
            tokio::task::yield_now().await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(QueryError::Unavailable("content backend down".into()));
            }
            self.inner.documents(collection).await
        }
    }

    fn seeded() -> MemoryContentSource {
        MemoryContentSource::new()
            .with_collection(
                "destinations",
                vec![
                    json!({"titre": "Islande", "slug": "islande", "published": true, "regions": ["nord"], "isTopDestination": true}),
                    json!({"titre": "Groenland", "slug": "groenland", "published": false}),
                ],
            )
            .with_collection(
                "regions",
                vec![json!({"nom": "Europe du Nord", "slug": "nord", "meta_description": "Fjords"})],
            )
            .with_collection("search_field", vec![json!({"placeholder": "Où partir ?"})])
            .with_collection("page_search", vec![json!({"title": "Nos voyages"})])
    }

    fn cache_over(source: Arc<CountingSource>) -> SearchDataCache {
        SearchDataCache::new(ContentQueryService::new(source))
    }

    #[tokio::test]
    async fn first_fetch_succeeds_then_short_circuits() {
        let source = CountingSource::new(seeded());
        let cache = cache_over(source.clone());
        assert_eq!(cache.destinations_status(), FetchStatus::Idle);

        let first = cache.fetch_destinations().await.unwrap();
        assert_eq!(cache.destinations_status(), FetchStatus::Success);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0]["slug"], json!("islande"));
        assert_eq!(first[0]["isTopDestination"], json!(true));

        let second = cache.fetch_destinations().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.destinations_status(), FetchStatus::Success);
        assert_eq!(source.calls("destinations"), 1);
    }

    #[tokio::test]
    async fn failure_sets_error_and_next_call_retries() {
        let source = CountingSource::new(seeded());
        source.fail.store(true, Ordering::SeqCst);
        let cache = cache_over(source.clone());

        assert!(cache.fetch_regions().await.is_none());
        assert_eq!(cache.regions_status(), FetchStatus::Error);
        assert!(cache.regions().is_none());

        source.fail.store(false, Ordering::SeqCst);
        let regions = cache.fetch_regions().await.unwrap();
        assert_eq!(regions[0]["nom"], json!("Europe du Nord"));
        assert_eq!(cache.regions_status(), FetchStatus::Success);
        assert_eq!(source.calls("regions"), 2);
    }

    #[tokio::test]
    async fn missing_singleton_succeeds_empty_and_is_queried_again() {
        let source = CountingSource::new(MemoryContentSource::new());
        let cache = cache_over(source.clone());

        assert!(cache.fetch_search_field_content().await.is_none());
        assert_eq!(cache.search_field_content_status(), FetchStatus::Success);
        assert!(cache.search_field_content().is_none());

        assert!(cache.fetch_search_field_content().await.is_none());
        assert_eq!(source.calls("search_field"), 2);
    }

    #[tokio::test]
    async fn initialize_fetches_everything_once() {
        let source = CountingSource::new(seeded());
        let cache = cache_over(source.clone());

        cache.initialize_search_data().await;
        cache.initialize_search_data().await;

        assert_eq!(source.total.load(Ordering::SeqCst), 4);
        let snap = cache.snapshot();
        assert_eq!(snap.destinations.status, FetchStatus::Success);
        assert_eq!(snap.regions.status, FetchStatus::Success);
        assert_eq!(
            snap.search_field_content.value.as_deref(),
            Some(&Some(json!({"placeholder": "Où partir ?"})))
        );
        assert_eq!(cache.content_text(), Some(json!({"title": "Nos voyages"})));
    }

    #[tokio::test]
    async fn clear_resets_all_entries() {
        let source = CountingSource::new(seeded());
        let cache = cache_over(source.clone());
        cache.initialize_search_data().await;

        source.fail.store(true, Ordering::SeqCst);
        cache.clear_search_data();
        cache.fetch_content_text().await;
        assert_eq!(cache.content_text_status(), FetchStatus::Error);

        cache.clear_search_data();
        for status in [
            cache.destinations_status(),
            cache.regions_status(),
            cache.search_field_content_status(),
            cache.content_text_status(),
        ] {
            assert_eq!(status, FetchStatus::Idle);
        }
        assert!(cache.destinations().is_none());
        assert!(cache.regions().is_none());
        assert!(cache.search_field_content().is_none());
        assert!(cache.content_text().is_none());
    }

    #[tokio::test]
    async fn concurrent_first_calls_both_query() {
        let source = CountingSource::new(seeded());
        let cache = cache_over(source.clone());

        let (a, b) = tokio::join!(cache.fetch_destinations(), cache.fetch_destinations());
        assert!(a.is_some() && b.is_some());
        assert_eq!(source.calls("destinations"), 2);
    }
}
