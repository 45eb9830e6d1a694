//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, expirations and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a value
    pub hits: u64,
    /// Lookups for keys that were not resident
    pub misses: u64,
    /// Lookups that found a stale entry and purged it
    pub expirations: u64,
    /// Entries removed for capacity
    pub evictions: u64,
    /// Eviction notifications the sink did not accept
    pub dropped_notifications: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `get`, whatever its outcome.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses + self.expirations
    }

    /// Share of lookups that returned a value; 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            total => self.hits as f64 / total as f64,
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_stats_are_zero() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_lookups_cover_every_outcome() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_expiration();
        stats.record_expiration();
        assert_eq!(stats.lookups(), 4);
        assert_eq!(stats.hit_rate(), 0.25);
    }

    #[test]
    fn test_evictions_accumulate_per_batch() {
        let mut stats = CacheStats::new();
        stats.record_evictions(3);
        stats.record_evictions(0);
        stats.record_evictions(2);
        assert_eq!(stats.evictions, 5);
        assert_eq!(stats.lookups(), 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut stats = CacheStats::new();
        stats.set_total_entries(7);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_entries"], 7);
        assert_eq!(json["dropped_notifications"], 0);
    }
}
