//! Response DTOs for the banner API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{BackpressurePolicy, CacheStats, CompositeKeyCache};

/// Response body for the stats endpoint (GET /stats)
///
/// Counters are flattened next to the cache's configuration.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub capacity: usize,
    pub eviction_batch_size: usize,
    /// Delivery policy of the eviction sink, absent without one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backpressure: Option<BackpressurePolicy>,
    /// Hit rate (hits / all lookups)
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Snapshots the statistics and sizing of `cache`.
    pub fn from_cache(cache: &CompositeKeyCache) -> Self {
        let stats = cache.stats();
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            capacity: cache.capacity(),
            eviction_batch_size: cache.eviction_batch_size(),
            backpressure: cache.backpressure(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::time::Duration;

    #[test]
    fn test_stats_response_flattens_counters() {
        let cache = CompositeKeyCache::new(2, 1).unwrap();
        cache.set(1, 1, Default::default(), Duration::from_secs(60));
        cache.get(1, 1).unwrap();
        let _ = cache.get(2, 2);

        let json: Value = serde_json::to_value(StatsResponse::from_cache(&cache)).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 1);
        assert_eq!(json["total_entries"], 1);
        assert_eq!(json["capacity"], 2);
        assert_eq!(json["eviction_batch_size"], 1);
        assert_eq!(json["hit_rate"], 0.5);
        assert!(json.get("backpressure").is_none());
    }

    #[test]
    fn test_stats_response_empty_cache() {
        let cache = CompositeKeyCache::new(10, 1).unwrap();
        let resp = StatsResponse::from_cache(&cache);
        assert_eq!(resp.hit_rate, 0.0);
        assert_eq!(resp.stats, CacheStats::default());
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
