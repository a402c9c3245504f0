//! Cache Entry Module
//!
//! Defines the immutable record stored for each cached key.

use serde::Serialize;
use serde_json::Value;

// == Entry ==
/// A single cached item with its priority class and absolute expiration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Key, unique across the cache while present
    pub key: String,
    /// Opaque payload, never inspected by the cache
    pub payload: Value,
    /// Priority class, lower values are evicted first
    pub priority: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expire_at: u64,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry expiring at the given absolute timestamp.
    pub fn new(key: String, payload: Value, priority: i64, expire_at: u64) -> Self {
        Self {
            key,
            payload,
            priority,
            expire_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expire_at`, the same
    /// rule the eviction sweep applies to expiration buckets.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expire_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at `now`, or 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expire_at.saturating_sub(now)
    }
}
