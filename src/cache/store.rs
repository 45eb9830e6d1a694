//! Cache Store Module
//!
//! Main cache engine combining the entry map with LFU frequency tracking and
//! lazy TTL expiration.
//!
//! All state (entries, frequency buckets, counters) sits behind one
//! `parking_lot::Mutex`. `get` mutates bucket placement too, so there is no
//! separate read path; every call takes the lock exclusively and blocks the
//! calling thread until it is done.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::cache::{
    BackpressurePolicy, CacheBuilder, CacheEntry, CacheStats, CompositeKey, Content, Eviction,
    EvictionSink, FrequencyList,
};
use crate::error::{CacheError, ConfigError};

// == Cache State ==
/// Everything the lock protects, mutated as one unit.
#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CompositeKey, CacheEntry>,
    frequencies: FrequencyList,
    len: usize,
    stats: CacheStats,
}

impl CacheState {
    fn lookup(&mut self, key: CompositeKey, now: Instant) -> Result<Content, CacheError> {
        let expired = match self.entries.get(&key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return Err(CacheError::Miss(key));
            }
        };

        if expired {
            self.remove(&key);
            self.stats.record_expiration();
            trace!(%key, "purged expired entry");
            return Err(CacheError::Expired(key));
        }

        let Some(entry) = self.entries.get_mut(&key) else {
            self.stats.record_miss();
            return Err(CacheError::Miss(key));
        };
        entry.bucket = self.frequencies.promote(key, Some(entry.bucket));
        self.stats.record_hit();
        Ok(entry.value.clone())
    }

    /// Inserts or refreshes `key`. Returns `true` when a new entry was created.
    fn upsert(&mut self, key: CompositeKey, value: Content, ttl: Duration, now: Instant) -> bool {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.refresh(value, ttl, now);
            entry.bucket = self.frequencies.promote(key, Some(entry.bucket));
            return false;
        }

        let bucket = self.frequencies.promote(key, None);
        self.entries
            .insert(key, CacheEntry::new(value, ttl, now, bucket));
        self.len += 1;
        true
    }

    fn remove(&mut self, key: &CompositeKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.frequencies.detach(entry.bucket, key);
        self.len -= 1;
        Some(entry)
    }

    /// Removes up to `batch` entries starting from the lowest frequency.
    ///
    /// Keys sharing a bucket leave in hash-set iteration order, except that
    /// `incoming` goes only once it is the last key of the lowest bucket.
    /// Evicted pairs are only collected when `collect` is set.
    fn evict(&mut self, batch: usize, incoming: CompositeKey, collect: bool) -> Vec<Eviction> {
        let mut evicted = Vec::new();
        let mut count = 0usize;

        while count < batch {
            let Some(front) = self.frequencies.front() else {
                break;
            };
            let Some(key) = self.frequencies.get(front).and_then(|bucket| {
                bucket
                    .keys()
                    .find(|key| **key != incoming)
                    .or_else(|| bucket.keys().next())
                    .copied()
            }) else {
                break;
            };
            let Some(entry) = self.remove(&key) else {
                break;
            };

            count += 1;
            if collect {
                evicted.push(Eviction {
                    key,
                    value: entry.value,
                });
            }
        }

        self.stats.record_evictions(count);
        debug!(count, remaining = self.len, "evicted least frequently used entries");
        evicted
    }

    fn validate(&self, capacity: usize) -> Result<(), CacheError> {
        self.frequencies.validate()?;

        if self.len != self.entries.len() {
            return Err(CacheError::InvariantViolation(format!(
                "size {} but {} entries stored",
                self.len,
                self.entries.len()
            )));
        }
        let bucketed = self.frequencies.entry_count();
        if bucketed != self.len {
            return Err(CacheError::InvariantViolation(format!(
                "size {} but {} keys bucketed",
                self.len, bucketed
            )));
        }
        if self.len > capacity {
            return Err(CacheError::InvariantViolation(format!(
                "size {} exceeds capacity {}",
                self.len, capacity
            )));
        }
        for (key, entry) in &self.entries {
            let placed = self
                .frequencies
                .get(entry.bucket)
                .is_some_and(|bucket| bucket.contains(key));
            if !placed {
                return Err(CacheError::InvariantViolation(format!(
                    "entry {} is missing from its bucket",
                    key
                )));
            }
        }
        Ok(())
    }
}

// == Notifier ==
/// Attached sink plus its delivery policy. Lives outside the lock.
struct Notifier {
    sink: Arc<dyn EvictionSink>,
    policy: BackpressurePolicy,
    dropped: AtomicU64,
}

impl Notifier {
    fn deliver(&self, eviction: Eviction) {
        let key = eviction.key;
        let result = match self.policy {
            BackpressurePolicy::Drop => self.sink.try_publish(eviction),
            BackpressurePolicy::Block | BackpressurePolicy::Deferred => {
                self.sink.publish(eviction)
            }
        };
        if let Err(err) = result {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(%key, error = %err, "eviction notification not delivered");
        }
    }
}

// == Composite Key Cache ==
/// LFU cache keyed by `(part_a, part_b)` with per-entry TTL.
///
/// Construct with [`CompositeKeyCache::new`] or [`CacheBuilder`]. Share
/// between threads with `Arc`.
pub struct CompositeKeyCache {
    state: Mutex<CacheState>,
    capacity: usize,
    eviction_batch_size: usize,
    notifier: Option<Notifier>,
}

impl CompositeKeyCache {
    // == Constructor ==
    /// Creates a cache without an eviction sink.
    ///
    /// Fails when either size is zero or `eviction_batch_size > capacity`.
    pub fn new(capacity: usize, eviction_batch_size: usize) -> Result<Self, ConfigError> {
        CacheBuilder::new(capacity)
            .eviction_batch_size(eviction_batch_size)
            .build()
    }

    /// Assembles a cache from already validated parts.
    pub(crate) fn from_parts(
        capacity: usize,
        eviction_batch_size: usize,
        sink: Option<(Arc<dyn EvictionSink>, BackpressurePolicy)>,
    ) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            capacity,
            eviction_batch_size,
            notifier: sink.map(|(sink, policy)| Notifier {
                sink,
                policy,
                dropped: AtomicU64::new(0),
            }),
        }
    }

    // == Get ==
    /// Looks up `(part_a, part_b)`.
    ///
    /// A hit bumps the entry's frequency and returns a copy of the value. A
    /// stale entry is purged and reported as [`CacheError::Expired`] once;
    /// later lookups see [`CacheError::Miss`].
    pub fn get(&self, part_a: i32, part_b: i32) -> Result<Content, CacheError> {
        self.get_at(CompositeKey::new(part_a, part_b), Instant::now())
    }

    pub(crate) fn get_at(&self, key: CompositeKey, now: Instant) -> Result<Content, CacheError> {
        self.state.lock().lookup(key, now)
    }

    // == Set ==
    /// Stores `value` under `(part_a, part_b)` for `ttl`.
    ///
    /// Existing keys keep their frequency (plus one) and never trigger
    /// eviction. A new key that pushes the size past capacity evicts up to
    /// `eviction_batch_size` entries from the lowest frequencies.
    pub fn set(&self, part_a: i32, part_b: i32, value: Content, ttl: Duration) {
        self.set_at(CompositeKey::new(part_a, part_b), value, ttl, Instant::now());
    }

    pub(crate) fn set_at(&self, key: CompositeKey, value: Content, ttl: Duration, now: Instant) {
        let deferred = {
            let mut state = self.state.lock();
            if !state.upsert(key, value, ttl, now) || state.len <= self.capacity {
                return;
            }

            let evicted = state.evict(self.eviction_batch_size, key, self.notifier.is_some());
            match &self.notifier {
                Some(notifier) if notifier.policy == BackpressurePolicy::Deferred => evicted,
                Some(notifier) => {
                    for eviction in evicted {
                        notifier.deliver(eviction);
                    }
                    Vec::new()
                }
                None => Vec::new(),
            }
        };

        if let Some(notifier) = &self.notifier {
            for eviction in deferred {
                notifier.deliver(eviction);
            }
        }
    }

    // == Introspection ==
    /// Current number of resident entries, expired-but-unread ones included.
    pub fn len(&self) -> usize {
        self.state.lock().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn eviction_batch_size(&self) -> usize {
        self.eviction_batch_size
    }

    /// Delivery policy of the attached sink, if any.
    pub fn backpressure(&self) -> Option<BackpressurePolicy> {
        self.notifier.as_ref().map(|notifier| notifier.policy)
    }

    /// Whether the key is resident. Neither promotes nor expires it.
    pub fn contains(&self, part_a: i32, part_b: i32) -> bool {
        self.state
            .lock()
            .entries
            .contains_key(&CompositeKey::new(part_a, part_b))
    }

    /// Access count of a resident key. Neither promotes nor expires it.
    pub fn frequency(&self, part_a: i32, part_b: i32) -> Option<u64> {
        let state = self.state.lock();
        state
            .entries
            .get(&CompositeKey::new(part_a, part_b))
            .and_then(|entry| state.frequencies.frequency(entry.bucket))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = {
            let state = self.state.lock();
            let mut stats = state.stats.clone();
            stats.set_total_entries(state.len);
            stats
        };
        if let Some(notifier) = &self.notifier {
            stats.dropped_notifications = notifier.dropped.load(Ordering::Relaxed);
        }
        stats
    }

    // == Invariants ==
    /// Verifies size accounting, bucket ordering and entry placement.
    pub fn check_invariants(&self) -> Result<(), CacheError> {
        self.state.lock().validate(self.capacity)
    }
}

impl fmt::Debug for CompositeKeyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeKeyCache")
            .field("capacity", &self.capacity)
            .field("eviction_batch_size", &self.eviction_batch_size)
            .field("len", &self.len())
            .field("backpressure", &self.backpressure())
            .finish()
    }
}
