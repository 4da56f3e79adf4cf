//! Cache Statistics Module
//!
//! Tracks response cache activity: hits, misses, bypasses and every way an entry
//! leaves the store.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Lookups answered from the store
    pub hits: u64,
    /// Lookups that found nothing live
    pub misses: u64,
    /// Reads that skipped lookup because of the bypass header
    pub bypasses: u64,
    /// Successful responses written to the store
    pub stores: u64,
    /// Entries removed by tag invalidation
    pub invalidated: u64,
    /// Entries removed because their TTL elapsed
    pub expired: u64,
    /// Entries dropped to make room at capacity
    pub evictions: u64,
    /// Administrative full flushes
    pub flushes: u64,
    /// Fills discarded because their family was invalidated mid-flight
    pub stale_fills: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_bypass(&mut self) {
        self.bypasses += 1;
    }

    pub fn record_store(&mut self) {
        self.stores += 1;
    }

    pub fn record_invalidated(&mut self, count: usize) {
        self.invalidated += count as u64;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_flush(&mut self) {
        self.flushes += 1;
    }

    pub fn record_stale_fill(&mut self) {
        self.stale_fills += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
