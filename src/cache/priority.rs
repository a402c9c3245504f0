//! Priority Index Module
//!
//! Maps each non-empty priority class to its recency list.

use std::collections::BTreeMap;

use crate::cache::RecencyList;

// == Priority Index ==
/// Priority classes in ascending order, each with its own LRU ordering.
///
/// A class is dropped as soon as its list empties, so the key set always
/// equals the set of live priority classes.
#[derive(Debug)]
pub struct PriorityIndex<V> {
    classes: BTreeMap<i64, RecencyList<V>>,
}

impl<V> PriorityIndex<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            classes: BTreeMap::new(),
        }
    }

    // == Put ==
    /// Inserts `key` as the most recent member of `priority`, creating the
    /// class if needed.
    pub fn put(&mut self, priority: i64, key: String, value: V) -> Option<V> {
        self.classes.entry(priority).or_default().put(key, value)
    }

    // == Touch ==
    /// Promotes `key` within `priority`. No-op if either is absent.
    pub fn touch(&mut self, priority: i64, key: &str) -> Option<&V> {
        self.classes.get_mut(&priority)?.touch(key)
    }

    // == Remove ==
    /// Removes `key` from `priority`, dropping the class once it is empty.
    pub fn remove(&mut self, priority: i64, key: &str) -> Option<V> {
        let list = self.classes.get_mut(&priority)?;
        let removed = list.remove(key);
        if list.is_empty() {
            self.classes.remove(&priority);
        }
        removed
    }

    // == Pop Lowest ==
    /// Removes the least recently used member of the lowest priority class.
    ///
    /// Returns `(priority, key, value)`, or `None` when no class is present.
    pub fn pop_lowest(&mut self) -> Option<(i64, String, V)> {
        let mut lowest = self.classes.first_entry()?;
        let priority = *lowest.key();
        let popped = lowest.get_mut().pop_least_recent();
        if lowest.get().is_empty() {
            lowest.remove();
        }
        popped.map(|(key, value)| (priority, key, value))
    }

    // == Accessors ==
    /// Returns the recency list for `priority`.
    pub fn class(&self, priority: i64) -> Option<&RecencyList<V>> {
        self.classes.get(&priority)
    }

    /// Returns the live priority classes in ascending order.
    pub fn priorities(&self) -> impl Iterator<Item = i64> + '_ {
        self.classes.keys().copied()
    }

    /// Returns the total number of keys across all classes.
    pub fn len(&self) -> usize {
        self.classes.values().map(RecencyList::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl<V> Default for PriorityIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}
