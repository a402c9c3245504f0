//! Expiration Index Module
//!
//! Groups keys by absolute expiration timestamp so expired entries can be
//! reclaimed in bulk.

use std::collections::{BTreeMap, BTreeSet};

// == Expiration Index ==
/// Ordered expiration buckets plus a derived ascending array of their
/// timestamps.
///
/// The array is rebuilt whenever a bucket is created or dropped, and is the
/// only structure the binary search looks at.
#[derive(Debug, Default)]
pub struct ExpirationIndex {
    buckets: BTreeMap<u64, BTreeSet<String>>,
    timestamps: Vec<u64>,
}

impl ExpirationIndex {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Adds `key` to the bucket for `expire_at`, creating the bucket if needed.
    pub fn insert(&mut self, expire_at: u64, key: String) {
        let created = !self.buckets.contains_key(&expire_at);
        self.buckets.entry(expire_at).or_default().insert(key);
        if created {
            self.rebuild_timestamps();
        }
    }

    // == Remove ==
    /// Removes `key` from the bucket for `expire_at`, dropping the bucket once
    /// it is empty. Returns whether the key was present.
    pub fn remove(&mut self, expire_at: u64, key: &str) -> bool {
        let Some(bucket) = self.buckets.get_mut(&expire_at) else {
            return false;
        };
        let removed = bucket.remove(key);
        if bucket.is_empty() {
            self.buckets.remove(&expire_at);
            self.rebuild_timestamps();
        }
        removed
    }

    // == Last Expired ==
    /// Binary searches the timestamp array for the rightmost bucket with
    /// `timestamp <= now`.
    ///
    /// Returns `None` when no bucket has expired.
    pub fn last_expired(&self, now: u64) -> Option<usize> {
        let last = self.timestamps.len().checked_sub(1)?;
        let (mut low, mut high) = (0, last);
        while low <= high {
            let mid = low + (high - low) / 2;
            if self.timestamps[mid] > now {
                if mid == 0 {
                    return None;
                }
                high = mid - 1;
            } else if mid == last || self.timestamps[mid + 1] > now {
                return Some(mid);
            } else {
                low = mid + 1;
            }
        }
        None
    }

    // == Drain Expired ==
    /// Removes every bucket with `timestamp <= now` and returns the keys they
    /// held, oldest bucket first.
    ///
    /// The timestamp array is rebuilt once, after the whole sweep.
    pub fn drain_expired(&mut self, now: u64) -> Vec<String> {
        let Some(boundary) = self.last_expired(now) else {
            return Vec::new();
        };
        let cutoff = self.timestamps[boundary];
        let live = match cutoff.checked_add(1) {
            Some(first_live) => self.buckets.split_off(&first_live),
            None => BTreeMap::new(),
        };
        let expired = std::mem::replace(&mut self.buckets, live);
        self.rebuild_timestamps();
        expired.into_values().flatten().collect()
    }

    // == Accessors ==
    /// Returns the ascending timestamps of all non-empty buckets.
    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }

    /// Returns whether `key` sits in the bucket for `expire_at`.
    pub fn contains(&self, expire_at: u64, key: &str) -> bool {
        self.buckets
            .get(&expire_at)
            .is_some_and(|bucket| bucket.contains(key))
    }

    /// Returns the total number of keys across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn rebuild_timestamps(&mut self) {
        self.timestamps = self.buckets.keys().copied().collect();
    }
}
