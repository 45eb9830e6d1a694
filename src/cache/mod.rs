//! Cache Module
//!
//! Provides an in-memory LFU cache keyed by `(i32, i32)` pairs, with lazy TTL
//! expiration and optional eviction notifications.

mod builder;
mod entry;
mod frequency;
mod key;
mod sink;
mod stats;
mod store;


// Re-export public types
pub use builder::CacheBuilder;
pub(crate) use builder::validate_sizing;
pub use entry::CacheEntry;
pub use frequency::{BucketId, FrequencyBucket, FrequencyList};
pub use key::CompositeKey;
pub use sink::{BackpressurePolicy, ChannelSink, Eviction, EvictionSink};
pub use stats::CacheStats;
pub use store::CompositeKeyCache;

// == Public Types ==
/// Cached value: a JSON object with arbitrary nested values.
pub type Content = serde_json::Map<String, serde_json::Value>;
