//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use crate::cache::{BucketId, Content};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored JSON object
    pub value: Content,
    /// Expiration instant, None = the TTL overflowed the clock and never expires
    pub expires_at: Option<Instant>,
    /// Frequency bucket currently holding this entry's key
    pub bucket: BucketId,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` after `now`.
    pub fn new(value: Content, ttl: Duration, now: Instant, bucket: BucketId) -> Self {
        Self {
            value,
            expires_at: now.checked_add(ttl),
            bucket,
        }
    }

    // == Refresh ==
    /// Replaces the value and restarts the TTL from `now`.
    pub fn refresh(&mut self, value: Content, ttl: Duration, now: Instant) {
        self.value = value;
        self.expires_at = now.checked_add(ttl);
    }

    // == Is Expired ==
    /// Checks whether the entry has expired at `now`.
    ///
    /// An entry is expired only once `now` is strictly past its expiry, so a
    /// read landing exactly on the expiry instant still hits.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now > expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining TTL at `now`, or None if the entry never expires.
    ///
    /// Returns `Some(Duration::ZERO)` once the entry has expired.
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(now))
    }
}
