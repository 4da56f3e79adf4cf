//! Invalidation Engine
//!
//! Tag-based purging of cached reads after a successful mutation.

use tracing::debug;

use crate::cache::CacheStore;
use crate::routing::Tag;

/// Deletes every key belonging to `tag`; returns how many were removed.
///
/// Matching is on the family recorded in the key, which the classifier derived from
/// a whole-segment prefix match, so `/portfolio` never purges `/portfolios/...`.
/// A tag with no keys removes nothing, but still advances the tag's generation so
/// reads already in flight are not written back.
pub fn invalidate(store: &mut CacheStore, tag: Tag) -> usize {
    store.advance_generation(tag);

    let mut removed = 0;
    for key in store.keys() {
        if key.family() == tag && store.delete(&key) {
            removed += 1;
        }
    }

    store.record_invalidated(removed);
    debug!(tag = %tag, removed, "invalidated tag");
    removed
}

/// Invalidates each tag independently, in order; returns per-tag counts.
///
/// An empty result for one tag never skips the ones after it.
pub fn invalidate_all(store: &mut CacheStore, tags: &[Tag]) -> Vec<(Tag, usize)> {
    tags.iter().map(|&tag| (tag, invalidate(store, tag))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, CachedResponse};
    use crate::routing::RouteFamily;
    use axum::body::Bytes;
    use std::time::Duration;

    fn populated() -> CacheStore {
        let mut store = CacheStore::new(100);
        let ttl = Duration::from_secs(60);
        for (family, path) in [
            (RouteFamily::Portfolio, "/portfolio/overview"),
            (RouteFamily::Portfolio, "/portfolio/holdings?page=2"),
            (RouteFamily::Transaction, "/transaction/list"),
            (RouteFamily::Profile, "/profile"),
        ] {
            store.set(
                CacheKey::new(family, path),
                CachedResponse::new(None, Bytes::from_static(b"{}")),
                ttl,
            );
        }
        store
    }

    #[test]
    fn test_invalidate_removes_only_tagged_family() {
        let mut store = populated();

        assert_eq!(invalidate(&mut store, RouteFamily::Portfolio), 2);
        assert_eq!(store.len(), 2);
        assert!(store
            .keys()
            .iter()
            .all(|key| key.family() != RouteFamily::Portfolio));
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let mut store = populated();

        assert_eq!(invalidate(&mut store, RouteFamily::Transaction), 1);
        assert_eq!(invalidate(&mut store, RouteFamily::Transaction), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_invalidate_advances_generation_even_when_empty() {
        let mut store = CacheStore::new(100);
        let before = store.generation(RouteFamily::Transaction);

        assert_eq!(invalidate(&mut store, RouteFamily::Transaction), 0);
        assert_eq!(store.generation(RouteFamily::Transaction), before + 1);
        assert_eq!(store.generation(RouteFamily::Profile), 0);
    }

    #[test]
    fn test_invalidate_all_processes_every_tag() {
        let mut store = populated();
        invalidate(&mut store, RouteFamily::Transaction);

        // The first tag finds nothing; the second must still run.
        let counts = invalidate_all(
            &mut store,
            &[RouteFamily::Transaction, RouteFamily::Portfolio],
        );

        assert_eq!(
            counts,
            vec![(RouteFamily::Transaction, 0), (RouteFamily::Portfolio, 2)]
        );
        assert_eq!(store.keys(), vec![CacheKey::new(RouteFamily::Profile, "/profile")]);
        assert_eq!(store.stats().invalidated, 3);
    }
}
