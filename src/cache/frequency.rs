//! Frequency List Module
//!
//! Ordered sequence of frequency buckets backing the LFU policy.
//!
//! Buckets live in an arena (`Vec<Option<FrequencyBucket>>` plus a free list)
//! and are chained front-to-back in strictly ascending frequency order.
//! Entries refer to their bucket through a [`BucketId`] handle, and buckets hold
//! only keys, so neither structure owns the other.
//!
//! ```text
//!   head                                       tail
//!    │                                           │
//!    ▼                                           ▼
//!  [freq=1 {B, D}] ◄──► [freq=2 {A}] ◄──► [freq=5 {C}]
//! ```
//!
//! Every structural edit is O(1): callers always hold the exact position they
//! operate on, and promotion only ever looks at an entry's current bucket and
//! its immediate successor.

use std::collections::HashSet;

use crate::cache::CompositeKey;
use crate::error::CacheError;

// == Bucket Handle ==
/// Arena index of a bucket. Valid until the bucket is unlinked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BucketId(usize);

impl BucketId {
    pub fn index(self) -> usize {
        self.0
    }
}

// == Frequency Bucket ==
/// Set of keys sharing the same access count.
#[derive(Debug)]
pub struct FrequencyBucket {
    frequency: u64,
    entries: HashSet<CompositeKey>,
    prev: Option<BucketId>,
    next: Option<BucketId>,
}

impl FrequencyBucket {
    fn new(frequency: u64, prev: Option<BucketId>, next: Option<BucketId>) -> Self {
        Self {
            frequency,
            entries: HashSet::new(),
            prev,
            next,
        }
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.entries.contains(key)
    }

    /// Keys in this bucket, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.entries.iter()
    }
}

// == Frequency List ==
/// Arena-backed doubly linked list of frequency buckets.
#[derive(Debug, Default)]
pub struct FrequencyList {
    slots: Vec<Option<FrequencyBucket>>,
    free_list: Vec<usize>,
    head: Option<BucketId>,
    tail: Option<BucketId>,
    len: usize,
}

impl FrequencyList {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    /// Number of linked buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total number of keys across all buckets.
    pub fn entry_count(&self) -> usize {
        self.iter().map(FrequencyBucket::len).sum()
    }

    // == Navigation ==
    /// Lowest-frequency bucket, or `None` when the list is empty.
    pub fn front(&self) -> Option<BucketId> {
        self.head
    }

    pub fn next(&self, position: BucketId) -> Option<BucketId> {
        self.get(position).and_then(|bucket| bucket.next)
    }

    pub fn get(&self, position: BucketId) -> Option<&FrequencyBucket> {
        self.slots.get(position.0).and_then(|slot| slot.as_ref())
    }

    fn get_mut(&mut self, position: BucketId) -> Option<&mut FrequencyBucket> {
        self.slots.get_mut(position.0).and_then(|slot| slot.as_mut())
    }

    pub fn frequency(&self, position: BucketId) -> Option<u64> {
        self.get(position).map(FrequencyBucket::frequency)
    }

    /// Buckets front-to-back.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Structural Edits ==
    fn allocate(&mut self, bucket: FrequencyBucket) -> BucketId {
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx] = Some(bucket);
            idx
        } else {
            self.slots.push(Some(bucket));
            self.slots.len() - 1
        };
        self.len += 1;
        BucketId(idx)
    }

    /// Splices a new, empty bucket in at the head.
    pub fn insert_front(&mut self, frequency: u64) -> BucketId {
        let old_head = self.head;
        let id = self.allocate(FrequencyBucket::new(frequency, None, old_head));
        match old_head {
            Some(head) => {
                if let Some(bucket) = self.get_mut(head) {
                    bucket.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        id
    }

    /// Splices a new, empty bucket in directly after `position`.
    ///
    /// A released `position` falls back to [`insert_front`](Self::insert_front).
    pub fn insert_after(&mut self, position: BucketId, frequency: u64) -> BucketId {
        let Some(next) = self.get(position).map(|bucket| bucket.next) else {
            return self.insert_front(frequency);
        };

        let id = self.allocate(FrequencyBucket::new(frequency, Some(position), next));
        if let Some(bucket) = self.get_mut(position) {
            bucket.next = Some(id);
        }
        match next {
            Some(next) => {
                if let Some(bucket) = self.get_mut(next) {
                    bucket.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        id
    }

    /// Unlinks the bucket at `position` if its key set is empty.
    ///
    /// Returns `true` when the bucket was removed.
    pub fn remove_if_empty(&mut self, position: BucketId) -> bool {
        let (prev, next) = match self.get(position) {
            Some(bucket) if bucket.is_empty() => (bucket.prev, bucket.next),
            _ => return false,
        };

        match prev {
            Some(prev) => {
                if let Some(bucket) = self.get_mut(prev) {
                    bucket.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(bucket) = self.get_mut(next) {
                    bucket.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        self.slots[position.0] = None;
        self.free_list.push(position.0);
        self.len -= 1;
        true
    }

    // == Membership ==
    pub fn attach(&mut self, position: BucketId, key: CompositeKey) -> bool {
        self.get_mut(position)
            .map_or(false, |bucket| bucket.entries.insert(key))
    }

    /// Removes `key` from the bucket, dropping the bucket if it becomes empty.
    pub fn detach(&mut self, position: BucketId, key: &CompositeKey) -> bool {
        let removed = self
            .get_mut(position)
            .map_or(false, |bucket| bucket.entries.remove(key));
        self.remove_if_empty(position);
        removed
    }

    // == Promotion ==
    /// Moves `key` from `current` to the bucket one frequency higher.
    ///
    /// `current == None` places a brand-new key at frequency 1. The target
    /// bucket is reused when it already sits right after `current` (or at the
    /// front for new keys); otherwise it is created in that position.
    /// Returns the key's new bucket.
    pub fn promote(&mut self, key: CompositeKey, current: Option<BucketId>) -> BucketId {
        let placed = current.and_then(|id| self.frequency(id).map(|freq| (id, freq)));

        let (target_frequency, candidate) = match placed {
            Some((id, freq)) => (freq + 1, self.next(id)),
            None => (1, self.front()),
        };

        let target = match candidate {
            Some(id) if self.frequency(id) == Some(target_frequency) => id,
            _ => match placed {
                Some((id, _)) => self.insert_after(id, target_frequency),
                None => self.insert_front(target_frequency),
            },
        };

        self.attach(target, key);
        if let Some((id, _)) = placed {
            self.detach(id, &key);
        }
        target
    }

    // == Invariants ==
    /// Walks the list checking links, ordering and emptiness.
    pub(crate) fn validate(&self) -> Result<(), CacheError> {
        let mut prev: Option<BucketId> = None;
        let mut prev_frequency = 0u64;
        let mut seen = 0usize;
        let mut cursor = self.head;

        while let Some(id) = cursor {
            let bucket = self.get(id).ok_or_else(|| {
                CacheError::InvariantViolation(format!("bucket {} is linked but released", id.0))
            })?;
            if bucket.prev != prev {
                return Err(CacheError::InvariantViolation(format!(
                    "bucket {} has a broken back link",
                    id.0
                )));
            }
            if bucket.frequency <= prev_frequency {
                return Err(CacheError::InvariantViolation(format!(
                    "frequency {} follows {}",
                    bucket.frequency, prev_frequency
                )));
            }
            if bucket.is_empty() {
                return Err(CacheError::InvariantViolation(format!(
                    "empty bucket at frequency {}",
                    bucket.frequency
                )));
            }
            prev = Some(id);
            prev_frequency = bucket.frequency;
            seen += 1;
            cursor = bucket.next;
        }

        if self.tail != prev {
            return Err(CacheError::InvariantViolation(
                "tail does not match the last linked bucket".to_string(),
            ));
        }
        if seen != self.len {
            return Err(CacheError::InvariantViolation(format!(
                "{} buckets linked but length is {}",
                seen, self.len
            )));
        }
        Ok(())
    }
}

// == Iterator ==
pub struct Iter<'a> {
    list: &'a FrequencyList,
    cursor: Option<BucketId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a FrequencyBucket;

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.list.get(self.cursor?)?;
        self.cursor = bucket.next;
        Some(bucket)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: i32) -> CompositeKey {
        CompositeKey::new(n, n)
    }

    fn frequencies(list: &FrequencyList) -> Vec<u64> {
        list.iter().map(FrequencyBucket::frequency).collect()
    }

    #[test]
    fn test_list_new_is_empty() {
        let list = FrequencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.entry_count(), 0);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_insert_front_and_after_keep_order() {
        let mut list = FrequencyList::new();
        let three = list.insert_front(3);
        let one = list.insert_front(1);
        list.insert_after(one, 2);
        list.insert_after(three, 7);

        assert_eq!(frequencies(&list), vec![1, 2, 3, 7]);
        assert_eq!(list.front(), Some(one));
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_remove_if_empty_only_removes_empty_buckets() {
        let mut list = FrequencyList::new();
        let one = list.insert_front(1);
        let two = list.insert_after(one, 2);
        list.attach(two, key(1));

        assert!(!list.remove_if_empty(two));
        assert!(list.remove_if_empty(one));
        assert_eq!(list.front(), Some(two));
        assert_eq!(frequencies(&list), vec![2]);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_detach_drops_emptied_bucket() {
        let mut list = FrequencyList::new();
        let one = list.promote(key(1), None);
        assert!(list.detach(one, &key(1)));
        assert!(list.is_empty());
        assert_eq!(list.get(one).map(FrequencyBucket::len), None);
    }

    #[test]
    fn test_promote_new_keys_share_frequency_one() {
        let mut list = FrequencyList::new();
        let a = list.promote(key(1), None);
        let b = list.promote(key(2), None);

        assert_eq!(a, b);
        assert_eq!(list.len(), 1);
        assert_eq!(list.frequency(a), Some(1));
        assert_eq!(list.entry_count(), 2);
    }

    #[test]
    fn test_promote_moves_key_up_one_level() {
        let mut list = FrequencyList::new();
        let one = list.promote(key(1), None);
        list.promote(key(2), None);

        let two = list.promote(key(1), Some(one));
        assert_eq!(list.frequency(two), Some(2));
        assert!(list.get(two).is_some_and(|b| b.contains(&key(1))));
        assert!(list.get(one).is_some_and(|b| !b.contains(&key(1))));
        assert_eq!(frequencies(&list), vec![1, 2]);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_promote_reuses_successor_with_target_frequency() {
        let mut list = FrequencyList::new();
        let one = list.promote(key(1), None);
        list.promote(key(2), None);
        let two = list.promote(key(1), Some(one));

        let again = list.promote(key(2), Some(one));
        assert_eq!(again, two);
        assert_eq!(frequencies(&list), vec![2]);
        assert_eq!(list.get(two).map(FrequencyBucket::len), Some(2));
    }

    #[test]
    fn test_promote_fills_gap_between_buckets() {
        let mut list = FrequencyList::new();
        let mut a = list.promote(key(1), None);
        for _ in 0..3 {
            a = list.promote(key(1), Some(a));
        }
        let b = list.promote(key(2), None);
        list.promote(key(3), None);

        // key 1 sits at 4; promoting key 2 must create 2 between 1 and 4.
        let b2 = list.promote(key(2), Some(b));
        assert_eq!(list.frequency(b2), Some(2));
        assert_eq!(frequencies(&list), vec![1, 2, 4]);
        assert!(list.validate().is_ok());
    }

    #[test]
    fn test_promote_new_key_before_higher_front() {
        let mut list = FrequencyList::new();
        let a = list.promote(key(1), None);
        list.promote(key(1), Some(a));
        assert_eq!(frequencies(&list), vec![2]);

        let b = list.promote(key(2), None);
        assert_eq!(list.front(), Some(b));
        assert_eq!(frequencies(&list), vec![1, 2]);
    }

    #[test]
    fn test_released_slots_are_reused() {
        let mut list = FrequencyList::new();
        let one = list.promote(key(1), None);
        let two = list.promote(key(1), Some(one));
        assert!(list.get(one).is_none());

        let fresh = list.promote(key(2), None);
        assert_eq!(fresh.index(), one.index());
        assert_eq!(list.next(fresh), Some(two));
    }
}
