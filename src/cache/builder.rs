//! Cache Builder Module
//!
//! Construction-time configuration for [`CompositeKeyCache`].

use std::sync::Arc;

use crate::cache::{BackpressurePolicy, CompositeKeyCache, EvictionSink};
use crate::config::Config;
use crate::error::ConfigError;

// == Cache Builder ==
/// Collects sizing and sink settings, validated by [`build`](Self::build).
///
/// ```
/// use std::sync::Arc;
/// use banner_cache::cache::{BackpressurePolicy, CacheBuilder, ChannelSink};
///
/// let (sink, _evictions) = ChannelSink::bounded(64);
/// let cache = CacheBuilder::new(1000)
///     .eviction_batch_size(20)
///     .eviction_sink(Arc::new(sink), BackpressurePolicy::Deferred)
///     .build()
///     .unwrap();
/// assert_eq!(cache.capacity(), 1000);
/// ```
pub struct CacheBuilder {
    capacity: usize,
    eviction_batch_size: usize,
    sink: Option<(Arc<dyn EvictionSink>, BackpressurePolicy)>,
}

impl CacheBuilder {
    /// Starts a builder with an eviction batch size of 1 and no sink.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            eviction_batch_size: 1,
            sink: None,
        }
    }

    /// Starts a builder from the cache sizing fields of `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_capacity).eviction_batch_size(config.eviction_batch_size)
    }

    /// Entries removed each time a new key pushes the cache over capacity.
    pub fn eviction_batch_size(mut self, eviction_batch_size: usize) -> Self {
        self.eviction_batch_size = eviction_batch_size;
        self
    }

    /// Attaches a sink and the policy used to deliver to it.
    pub fn eviction_sink(
        mut self,
        sink: Arc<dyn EvictionSink>,
        policy: BackpressurePolicy,
    ) -> Self {
        self.sink = Some((sink, policy));
        self
    }

    pub fn build(self) -> Result<CompositeKeyCache, ConfigError> {
        validate_sizing(self.capacity, self.eviction_batch_size)?;
        Ok(CompositeKeyCache::from_parts(
            self.capacity,
            self.eviction_batch_size,
            self.sink,
        ))
    }
}

/// Rejects zero sizes and batches larger than the cache itself.
pub(crate) fn validate_sizing(
    capacity: usize,
    eviction_batch_size: usize,
) -> Result<(), ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::ZeroCapacity);
    }
    if eviction_batch_size == 0 {
        return Err(ConfigError::ZeroBatchSize);
    }
    if eviction_batch_size > capacity {
        return Err(ConfigError::BatchExceedsCapacity {
            batch_size: eviction_batch_size,
            capacity,
        });
    }
    Ok(())
}
