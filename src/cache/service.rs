//! Cache Service Module
//!
//! The process-wide response cache: one shared store, the classifier and the
//! settings, constructed once at startup and handed to the router and sweep task.

use std::sync::Arc;

use axum::http::{Method, Uri};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{invalidation, CacheKey, CacheStore, CachedResponse};
use crate::config::CacheSettings;
use crate::models::{CacheStatusResponse, EntryStatus};
use crate::routing::{Classification, RequestClassifier, RouteFamily, Tag};

// == Cache Service ==
/// Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct CacheService {
    store: Arc<RwLock<CacheStore>>,
    classifier: Arc<RequestClassifier>,
    settings: Arc<CacheSettings>,
}

impl CacheService {
    /// Creates a service with the built-in mutation rules.
    pub fn new(settings: CacheSettings) -> Self {
        let classifier = RequestClassifier::new(settings.api_base_path.clone());
        Self::with_classifier(settings, classifier)
    }

    pub fn with_classifier(settings: CacheSettings, classifier: RequestClassifier) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(settings.max_entries))),
            classifier: Arc::new(classifier),
            settings: Arc::new(settings),
        }
    }

    /// Shared store handle, for the background sweep.
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        self.store.clone()
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn classify(&self, method: &Method, uri: &Uri) -> Classification {
        self.classifier.classify(method, uri)
    }

    // == Reads ==
    /// Returns the live cached payload for `key`, if any.
    pub async fn lookup(&self, key: &CacheKey) -> Option<CachedResponse> {
        self.store.write().await.get(key)
    }

    /// Drops any entry for `key` ahead of a forced refresh; returns whether one existed.
    pub async fn bypass(&self, key: &CacheKey) -> bool {
        let mut store = self.store.write().await;
        store.record_bypass();
        store.delete(key)
    }

    /// Invalidation generation of `family`; read before fetching a miss and handed
    /// back to [`CacheService::populate`].
    pub async fn generation(&self, family: RouteFamily) -> u64 {
        self.store.read().await.generation(family)
    }

    /// Stores a response under `key` with its family's TTL, unless the family was
    /// invalidated after `generation` was read. Returns whether it was stored.
    pub async fn populate(&self, key: CacheKey, value: CachedResponse, generation: u64) -> bool {
        let ttl = self.settings.ttl.ttl_for(key.family());
        let size = value.size_bytes();

        let stored = self
            .store
            .write()
            .await
            .set_if_current(key.clone(), value, ttl, generation);

        if stored {
            debug!(key = %key, ttl_secs = ttl.as_secs(), size, "caching response");
        } else {
            debug!(key = %key, "family invalidated during fetch, response not cached");
        }
        stored
    }

    // == Invalidation ==
    /// Purges every tag under one lock acquisition; returns the total removed.
    pub async fn invalidate(&self, tags: &[Tag]) -> usize {
        let counts = {
            let mut store = self.store.write().await;
            invalidation::invalidate_all(&mut store, tags)
        };

        let total: usize = counts.iter().map(|(_, removed)| removed).sum();
        debug!(?counts, total, "mutation invalidated cached reads");
        total
    }

    // == Administration ==
    /// Empties the store atomically; returns the number of entries dropped.
    pub async fn flush(&self) -> usize {
        let cleared = self.store.write().await.flush_all();
        info!(cleared, "response cache flushed");
        cleared
    }

    /// Snapshot of store occupancy, optionally restricted to one family.
    pub async fn status(&self, family: Option<RouteFamily>) -> CacheStatusResponse {
        let store = self.store.read().await;

        let mut entries: Vec<EntryStatus> = store
            .iter()
            .filter(|(key, _)| family.map_or(true, |f| key.family() == f))
            .map(|(key, entry)| EntryStatus::new(key, entry))
            .collect();
        entries.sort_by(|a, b| a.key.path_and_query().cmp(b.key.path_and_query()));

        CacheStatusResponse::new(
            self.settings.enabled,
            store.max_entries(),
            store.stats(),
            entries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use std::time::Duration;

    fn payload() -> CachedResponse {
        CachedResponse::new(None, Bytes::from_static(br#"{"success":true}"#))
    }

    fn key(family: RouteFamily, path: &str) -> CacheKey {
        CacheKey::new(family, path)
    }

    async fn fill(service: &CacheService, key: CacheKey) {
        let generation = service.generation(key.family()).await;
        assert!(service.populate(key, payload(), generation).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_populate_uses_family_ttl() {
        let service = CacheService::new(CacheSettings::default());
        let overview = key(RouteFamily::Portfolio, "/portfolio/overview");
        let profile = key(RouteFamily::Profile, "/profile");

        fill(&service, overview.clone()).await;
        fill(&service, profile.clone()).await;

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(service.lookup(&overview).await.is_none());
        assert!(service.lookup(&profile).await.is_some());
    }

    #[tokio::test]
    async fn test_bypass_deletes_and_counts() {
        let service = CacheService::new(CacheSettings::default());
        let overview = key(RouteFamily::Portfolio, "/portfolio/overview");

        fill(&service, overview.clone()).await;
        assert!(service.bypass(&overview).await);
        assert!(!service.bypass(&overview).await);

        let status = service.status(None).await;
        assert_eq!(status.stats.bypasses, 2);
        assert!(status.entries.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_sums_tags() {
        let service = CacheService::new(CacheSettings::default());
        fill(&service, key(RouteFamily::Portfolio, "/portfolio/overview")).await;
        fill(&service, key(RouteFamily::Transaction, "/transaction/list")).await;
        fill(&service, key(RouteFamily::Profile, "/profile")).await;

        let removed = service
            .invalidate(&[RouteFamily::Transaction, RouteFamily::Portfolio])
            .await;

        assert_eq!(removed, 2);
        assert_eq!(service.status(None).await.entries.len(), 1);
    }

    #[tokio::test]
    async fn test_status_filters_by_family() {
        let service = CacheService::new(CacheSettings::default());
        fill(&service, key(RouteFamily::Portfolio, "/portfolio/b")).await;
        fill(&service, key(RouteFamily::Portfolio, "/portfolio/a")).await;
        fill(&service, key(RouteFamily::Profile, "/profile")).await;

        let status = service.status(Some(RouteFamily::Portfolio)).await;
        let paths: Vec<&str> = status.entries.iter().map(|e| e.key.path_and_query()).collect();
        assert_eq!(paths, vec!["/portfolio/a", "/portfolio/b"]);
        assert_eq!(status.stats.total_entries, 3);
    }

    #[tokio::test]
    async fn test_flush_reports_count() {
        let service = CacheService::new(CacheSettings::default());
        fill(&service, key(RouteFamily::Profile, "/profile")).await;

        assert_eq!(service.flush().await, 1);
        assert_eq!(service.flush().await, 0);
    }

    #[tokio::test]
    async fn test_populate_skips_fill_that_raced_invalidation() {
        let service = CacheService::new(CacheSettings::default());
        let overview = key(RouteFamily::Portfolio, "/portfolio/overview");

        let generation = service.generation(RouteFamily::Portfolio).await;
        service.invalidate(&[RouteFamily::Portfolio]).await;

        assert!(!service.populate(overview.clone(), payload(), generation).await);
        assert!(service.lookup(&overview).await.is_none());
        assert_eq!(service.status(None).await.stats.stale_fills, 1);
    }

    #[tokio::test]
    async fn test_populate_skips_fill_that_raced_flush() {
        let service = CacheService::new(CacheSettings::default());
        let profile = key(RouteFamily::Profile, "/profile");

        let generation = service.generation(RouteFamily::Profile).await;
        service.flush().await;

        assert!(!service.populate(profile, payload(), generation).await);
        assert!(service.status(None).await.entries.is_empty());
    }
}
