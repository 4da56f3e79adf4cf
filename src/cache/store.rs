//! Cache Store Module
//!
//! In-memory response storage with per-entry TTL and a capacity bound. Knows nothing
//! about HTTP; the middleware decides what goes in.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheKey, CacheStats, CachedResponse};
use crate::routing::RouteFamily;

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<CacheKey, CacheEntry>,
    stats: CacheStats,
    /// Per-family counters bumped on every invalidation and flush
    generations: HashMap<RouteFamily, u64>,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` responses (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            generations: HashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Set ==
    /// Stores a response, overwriting any previous entry and restarting its TTL.
    ///
    /// Inserting a new key into a full store first drops expired entries, then the
    /// oldest-inserted one if that freed nothing.
    pub fn set(&mut self, key: CacheKey, value: CachedResponse, ttl: Duration) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }

        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.stats.record_store();
        self.stats.set_total_entries(self.entries.len());
    }

    /// Stores a response only if its family has not been invalidated since
    /// `generation` was read; returns whether it was stored.
    ///
    /// A fill that raced a successful mutation would otherwise write pre-mutation
    /// data back after the purge.
    pub fn set_if_current(
        &mut self,
        key: CacheKey,
        value: CachedResponse,
        ttl: Duration,
        generation: u64,
    ) -> bool {
        if self.generation(key.family()) != generation {
            self.stats.record_stale_fill();
            return false;
        }
        self.set(key, value, ttl);
        true
    }

    fn make_room(&mut self) {
        if self.cleanup_expired() > 0 {
            return;
        }

        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.inserted_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
            self.stats.record_eviction();
        }
    }

    // == Get ==
    /// Returns the live payload for `key`.
    ///
    /// An expired entry counts as a miss and is removed on the spot.
    pub fn get(&mut self, key: &CacheKey) -> Option<CachedResponse> {
        let expired = self.entries.get(key).map(CacheEntry::is_expired);

        match expired {
            Some(false) => {
                self.stats.record_hit();
                self.entries.get(key).map(|entry| entry.value.clone())
            }
            Some(true) => {
                self.entries.remove(key);
                self.stats.record_expired(1);
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry; returns whether one was present.
    pub fn delete(&mut self, key: &CacheKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Keys ==
    /// Every key currently held, expired or not.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries.keys().cloned().collect()
    }

    /// Iterates over all entries, expired ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&CacheKey, &CacheEntry)> {
        self.entries.iter()
    }

    // == Flush All ==
    /// Empties the store; returns how many entries were dropped.
    pub fn flush_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        for family in RouteFamily::ALL {
            self.advance_generation(family);
        }
        self.stats.record_flush();
        self.stats.set_total_entries(0);
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries; returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let count = before - self.entries.len();

        self.stats.record_expired(count);
        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Generations ==
    /// Current invalidation generation of a family; starts at 0.
    pub fn generation(&self, family: RouteFamily) -> u64 {
        self.generations.get(&family).copied().unwrap_or(0)
    }

    /// Marks every in-flight fill for `family` as stale.
    pub fn advance_generation(&mut self, family: RouteFamily) {
        *self.generations.entry(family).or_insert(0) += 1;
    }

    pub fn record_bypass(&mut self) {
        self.stats.record_bypass();
    }

    pub fn record_invalidated(&mut self, count: usize) {
        self.stats.record_invalidated(count);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}
