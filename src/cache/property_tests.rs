//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache invariants over random operation
//! sequences on a manual clock.

use proptest::prelude::*;
use serde_json::json;
use std::collections::{HashMap, HashSet};

use crate::cache::{Cache, Clock, ExpirationIndex, ManualClock};

// == Strategies ==
/// Small key space so sequences hit overwrites and removals often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}".prop_map(|s| s)
}

fn priority_strategy() -> impl Strategy<Value = i64> {
    -3i64..4
}

fn ttl_strategy() -> impl Strategy<Value = i64> {
    0i64..200
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, priority: i64, ttl: i64 },
    Get { key: String },
    Remove { key: String },
    Resize { capacity: i64 },
    Purge,
    Advance { ms: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), priority_strategy(), ttl_strategy())
            .prop_map(|(key, priority, ttl)| CacheOp::Set { key, priority, ttl }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => (1i64..8).prop_map(|capacity| CacheOp::Resize { capacity }),
        1 => Just(CacheOp::Purge),
        2 => (0u64..120).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

fn unique(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // **Property 1: Index Consistency**
    // *For any* sequence of operations, the primary table and both indices
    // hold exactly the same keys and the count never exceeds capacity.
    #[test]
    fn prop_indices_stay_consistent(
        capacity in 1i64..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let clock = ManualClock::new(0);
        let mut cache = Cache::with_clock(capacity, clock.clone()).unwrap();

        for op in ops {
            let before = cache.len();
            match op {
                CacheOp::Set { key, priority, ttl } => {
                    cache.set_item(key, json!(ttl), priority, Some(ttl)).unwrap();
                }
                CacheOp::Get { key } => {
                    let found = cache.get_item(&key).is_some();
                    prop_assert_eq!(found, cache.contains_key(&key));
                    prop_assert_eq!(cache.len(), before, "reads never remove entries");
                }
                CacheOp::Remove { key } => {
                    let existed = cache.contains_key(&key);
                    cache.remove(&key);
                    prop_assert_eq!(cache.len(), before - usize::from(existed));
                }
                CacheOp::Resize { capacity } => cache.set_max_items(capacity).unwrap(),
                CacheOp::Purge => {
                    cache.purge_expired();
                }
                CacheOp::Advance { ms } => clock.advance(ms),
            }
            cache.assert_consistent();
            prop_assert_eq!(cache.keys().len(), cache.len());
        }
    }

    // **Property 2: Expiration Correctness**
    // *For any* cache state, once a sweep runs at time t no entry with
    // expire_at <= t survives it.
    #[test]
    fn prop_sweep_removes_all_expired(
        items in prop::collection::vec((key_strategy(), priority_strategy(), ttl_strategy()), 1..30),
        later in 0u64..250
    ) {
        let clock = ManualClock::new(1_000);
        let mut cache = Cache::with_clock(100, clock.clone()).unwrap();
        for (key, priority, ttl) in items {
            cache.set_item(key, json!(null), priority, Some(ttl)).unwrap();
        }

        clock.advance(later);
        let now = clock.now_ms();
        let expected: usize = cache
            .keys()
            .iter()
            .filter(|k| cache.peek(k).is_some_and(|e| e.is_expired_at(now)))
            .count();

        prop_assert_eq!(cache.purge_expired(), expected);
        for key in cache.keys() {
            prop_assert!(!cache.peek(&key).unwrap().is_expired_at(now));
        }
        cache.assert_consistent();
    }

    // **Property 3: Expired Before Priority**
    // *For any* full cache holding at least one expired entry, an insert
    // removes only expired entries.
    #[test]
    fn prop_eviction_prefers_expired(
        items in prop::collection::vec((key_strategy(), priority_strategy(), ttl_strategy()), 2..20),
        later in 0u64..250
    ) {
        let clock = ManualClock::new(0);
        let capacity = items.len() as i64;
        let mut cache = Cache::with_clock(capacity, clock.clone()).unwrap();
        for (key, priority, ttl) in items {
            cache.set_item(key, json!(null), priority, Some(ttl)).unwrap();
        }
        cache.set_max_items(cache.len() as i64).unwrap();

        clock.advance(later);
        let now = clock.now_ms();
        let live: Vec<String> = cache
            .keys()
            .into_iter()
            .filter(|k| !cache.peek(k).unwrap().is_expired_at(now))
            .collect();
        prop_assume!(live.len() < cache.len());

        cache.set_item("new_key", json!(null), 0, Some(1_000)).unwrap();

        for key in &live {
            prop_assert!(cache.contains_key(key), "live key {} was evicted", key);
        }
        prop_assert_eq!(cache.len(), live.len() + 1);
    }

    // **Property 4: LRU Within Lowest Class**
    // *For any* set of same-priority keys inserted in order and never read,
    // overflow evicts them oldest first.
    #[test]
    fn prop_lru_eviction_order(keys in prop::collection::vec(key_strategy(), 2..10)) {
        let keys = unique(keys);
        prop_assume!(keys.len() >= 2);

        let mut cache = Cache::with_clock(keys.len() as i64, ManualClock::new(0)).unwrap();
        for key in &keys {
            cache.set_item(key.clone(), json!(null), 1, Some(10_000)).unwrap();
        }
        cache.set_item("zz_high", json!(null), 9, Some(10_000)).unwrap();

        prop_assert!(!cache.contains_key(&keys[0]));
        for key in keys.iter().skip(1) {
            prop_assert!(cache.contains_key(key));
        }
    }

    // **Property 5: Recency Promotion**
    // *For any* priority class, a key read after insertion is not the next
    // victim while an untouched peer remains.
    #[test]
    fn prop_get_promotes(keys in prop::collection::vec(key_strategy(), 3..10)) {
        let keys = unique(keys);
        prop_assume!(keys.len() >= 3);

        let mut cache = Cache::with_clock(keys.len() as i64, ManualClock::new(0)).unwrap();
        for key in &keys {
            cache.set_item(key.clone(), json!(null), 4, Some(10_000)).unwrap();
        }
        cache.get_item(&keys[0]);

        cache.set_item("zz_new", json!(null), 4, Some(10_000)).unwrap();

        prop_assert!(cache.contains_key(&keys[0]));
        prop_assert!(!cache.contains_key(&keys[1]));
    }

    // **Property 6: Lowest Class Is The Target**
    // *For any* mix of priorities with nothing expired, shrinking by one
    // evicts a member of the lowest priority class present.
    #[test]
    fn prop_victim_from_lowest_class(
        items in prop::collection::vec((key_strategy(), priority_strategy()), 2..15)
    ) {
        let mut cache = Cache::with_clock(100, ManualClock::new(0)).unwrap();
        for (key, priority) in items {
            cache.set_item(key, json!(null), priority, Some(10_000)).unwrap();
        }
        prop_assume!(cache.len() >= 2);

        let priorities: HashMap<String, i64> = cache
            .keys()
            .into_iter()
            .filter_map(|k| cache.peek(&k).map(|e| (k.clone(), e.priority)))
            .collect();
        let lowest = priorities.values().copied().min().unwrap();

        cache.set_max_items(cache.len() as i64 - 1).unwrap();

        let victims: Vec<&String> = priorities
            .keys()
            .filter(|k| !cache.contains_key(k))
            .collect();
        prop_assert_eq!(victims.len(), 1);
        prop_assert_eq!(priorities[victims[0]], lowest);
    }

    // **Property 7: Binary Search Boundary**
    // *For any* set of expiration buckets and any time, the search returns the
    // last bucket at or before that time.
    #[test]
    fn prop_last_expired_matches_linear_scan(
        timestamps in prop::collection::btree_set(0u64..1_000, 0..40),
        now in 0u64..1_100
    ) {
        let mut index = ExpirationIndex::new();
        for (i, ts) in timestamps.iter().enumerate() {
            index.insert(*ts, format!("k{i}"));
        }

        let expected = index.timestamps().iter().rposition(|ts| *ts <= now);
        prop_assert_eq!(index.last_expired(now), expected);
    }
}
