//! Cache Store Module
//!
//! Main cache engine tying the primary table to the expiration and priority
//! indices, and running the eviction pass.
//!
//! # Eviction policy
//! When room is needed the cache first reclaims every entry whose
//! expiration timestamp has passed, in one batch. Only if nothing has expired
//! does it evict a single victim: the least recently used entry of the lowest
//! priority class.
//!
//! # Lazy expiration
//! Expiration is enforced only by an eviction pass (or an explicit
//! [`Cache::purge_expired`]). Until one runs, [`Cache::get_item`] keeps
//! returning entries whose `expire_at` is already in the past.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::cache::{CacheStats, Clock, Entry, ExpirationIndex, PriorityIndex, SystemClock};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache ==
/// Bounded cache with TTL, priority classes and per-class LRU eviction.
///
/// Not internally synchronized; callers sharing one across threads wrap the
/// whole cache in a single lock.
#[derive(Debug)]
pub struct Cache<C: Clock = SystemClock> {
    /// Primary table, the single source of truth for presence
    entries: HashMap<String, Arc<Entry>>,
    /// Keys bucketed by expiration timestamp
    expirations: ExpirationIndex,
    /// Per-priority LRU ordering
    priorities: PriorityIndex<Arc<Entry>>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed, always > 0
    capacity: usize,
    /// TTL applied when `set_item` gets no explicit TTL
    default_ttl_ms: u64,
    clock: C,
}

impl Cache<SystemClock> {
    // == Constructor ==
    /// Creates a cache holding at most `capacity` entries, on the wall clock.
    pub fn new(capacity: i64) -> Result<Self> {
        Self::with_clock(capacity, SystemClock)
    }

    /// Creates a cache from configuration, on the wall clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_config_with_clock(config, SystemClock)
    }
}

impl<C: Clock> Cache<C> {
    /// Creates a cache holding at most `capacity` entries, reading time from
    /// `clock`.
    pub fn with_clock(capacity: i64, clock: C) -> Result<Self> {
        let capacity = validate_capacity(capacity)?;
        Ok(Self::build(capacity, Config::default().default_ttl_ms, clock))
    }

    /// Creates a cache from configuration, reading time from `clock`.
    pub fn from_config_with_clock(config: &Config, clock: C) -> Result<Self> {
        if config.max_items == 0 {
            return Err(CacheError::InvalidCapacity(0));
        }
        Ok(Self::build(config.max_items, config.default_ttl_ms, clock))
    }

    fn build(capacity: usize, default_ttl_ms: u64, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            expirations: ExpirationIndex::new(),
            priorities: PriorityIndex::new(),
            stats: CacheStats::new(),
            capacity,
            default_ttl_ms,
            clock,
        }
    }

    // == Get ==
    /// Looks up `key` and promotes it to most recently used within its
    /// priority class.
    ///
    /// Expiration is not checked here.
    pub fn get_item(&mut self, key: &str) -> Option<Arc<Entry>> {
        let Some(entry) = self.entries.get(key).cloned() else {
            trace!(key, "cache miss");
            self.stats.record_miss();
            return None;
        };
        self.priorities.touch(entry.priority, key);
        trace!(key, priority = entry.priority, "cache hit");
        self.stats.record_hit();
        Some(entry)
    }

    // == Peek ==
    /// Looks up `key` without touching recency or statistics.
    pub fn peek(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key).map(Arc::as_ref)
    }

    // == Set ==
    /// Stores `payload` under `key` with the given priority class and TTL.
    ///
    /// An existing entry for `key` is replaced, taking its index memberships
    /// with it. If the cache is then full, one eviction pass runs before the
    /// insert.
    ///
    /// # Arguments
    /// * `ttl_ms` - TTL in milliseconds, `None` uses the configured default
    pub fn set_item(
        &mut self,
        key: impl Into<String>,
        payload: Value,
        priority: i64,
        ttl_ms: Option<i64>,
    ) -> Result<()> {
        let ttl_ms = match ttl_ms {
            Some(ttl) if ttl < 0 => return Err(CacheError::InvalidTtl(ttl)),
            Some(ttl) => ttl as u64,
            None => self.default_ttl_ms,
        };
        let key = key.into();
        let now = self.clock.now_ms();

        self.detach(&key);
        if self.entries.len() >= self.capacity {
            self.evict(now);
        }

        let expire_at = now.saturating_add(ttl_ms);
        let entry = Arc::new(Entry::new(key.clone(), payload, priority, expire_at));
        self.expirations.insert(expire_at, key.clone());
        self.priorities.put(priority, key.clone(), Arc::clone(&entry));
        self.entries.insert(key, entry);
        trace!(priority, expire_at, "entry stored");

        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    // == Resize ==
    /// Changes the capacity, evicting until the cache fits.
    pub fn set_max_items(&mut self, capacity: i64) -> Result<()> {
        self.capacity = validate_capacity(capacity)?;
        let now = self.clock.now_ms();
        debug!(capacity = self.capacity, count = self.entries.len(), "capacity changed");

        while self.entries.len() > self.capacity {
            if self.evict(now) == 0 {
                break;
            }
        }

        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    // == Remove ==
    /// Removes `key` from the cache. No-op for absent keys.
    pub fn remove(&mut self, key: &str) -> Option<Arc<Entry>> {
        let removed = self.detach(key);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Purge Expired ==
    /// Reclaims every expired entry now, without evicting anything else.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let reclaimed = self.reclaim_expired(now);
        self.stats.set_total_entries(self.entries.len());
        reclaimed
    }

    // == Keys ==
    /// Returns every present key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Eviction Pass ==
    /// Frees at least one slot: every expired entry if any, otherwise the
    /// least recently used entry of the lowest priority class.
    ///
    /// Returns the number of entries removed, 0 only on an empty cache.
    fn evict(&mut self, now: u64) -> usize {
        let reclaimed = self.reclaim_expired(now);
        if reclaimed > 0 {
            return reclaimed;
        }

        let Some((priority, key, victim)) = self.priorities.pop_lowest() else {
            return 0;
        };
        self.entries.remove(&key);
        self.expirations.remove(victim.expire_at, &key);
        self.stats.record_eviction();
        debug!(key = %key, priority, "evicted least recently used entry");
        1
    }

    /// Removes every entry whose expiration bucket is at or before `now`.
    fn reclaim_expired(&mut self, now: u64) -> usize {
        let mut reclaimed = 0;
        for key in self.expirations.drain_expired(now) {
            if let Some(entry) = self.entries.remove(&key) {
                self.priorities.remove(entry.priority, &key);
                reclaimed += 1;
            }
        }
        if reclaimed > 0 {
            self.stats.record_expirations(reclaimed);
            debug!(reclaimed, now, "reclaimed expired entries");
        }
        reclaimed
    }

    /// Removes `key` from the primary table and both indices.
    fn detach(&mut self, key: &str) -> Option<Arc<Entry>> {
        let entry = self.entries.remove(key)?;
        self.priorities.remove(entry.priority, key);
        self.expirations.remove(entry.expire_at, key);
        Some(entry)
    }

    // == Consistency Check ==
    /// Panics unless the primary table and both indices agree exactly.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert!(self.capacity > 0, "capacity must stay positive");
        assert!(
            self.entries.len() <= self.capacity,
            "{} entries exceed capacity {}",
            self.entries.len(),
            self.capacity
        );
        assert_eq!(self.priorities.len(), self.entries.len());
        assert_eq!(self.expirations.len(), self.entries.len());

        for (key, entry) in &self.entries {
            assert_eq!(&entry.key, key);
            let class = self
                .priorities
                .class(entry.priority)
                .unwrap_or_else(|| panic!("missing priority class {}", entry.priority));
            assert!(class.contains(key), "{key} missing from its priority class");
            assert!(
                self.expirations.contains(entry.expire_at, key),
                "{key} missing from its expiration bucket"
            );
        }
        for priority in self.priorities.priorities() {
            assert!(self.priorities.class(priority).is_some_and(|c| !c.is_empty()));
        }
        assert!(self.expirations.timestamps().windows(2).all(|w| w[0] < w[1]));
    }
}

/// Rejects non-positive capacities.
fn validate_capacity(capacity: i64) -> Result<usize> {
    if capacity <= 0 {
        return Err(CacheError::InvalidCapacity(capacity));
    }
    usize::try_from(capacity).map_err(|_| CacheError::InvalidCapacity(capacity))
}
