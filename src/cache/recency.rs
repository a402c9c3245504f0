//! Recency List Module
//!
//! Least Recently Used ordering for a single priority class.
//!
//! Nodes live in a `Vec` and link to each other by index, so there is no
//! shared ownership between neighbours. Slots 0 and 1 are the head and tail
//! sentinels; freed slots are recycled through a free list.
//!
//! ```text
//!   HEAD ◄──► [a] ◄──► [b] ◄──► [c] ◄──► TAIL
//!            least              most
//!           recent             recent
//! ```

use std::collections::HashMap;
use std::mem;

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Debug)]
struct Node<V> {
    key: String,
    /// `None` for sentinels and free slots
    value: Option<V>,
    prev: usize,
    next: usize,
}

impl<V> Node<V> {
    fn sentinel() -> Self {
        Self {
            key: String::new(),
            value: None,
            prev: HEAD,
            next: TAIL,
        }
    }
}

// == Recency List ==
/// Keyed doubly linked list ordered from least to most recently touched.
///
/// All operations are O(1) through the key → slot lookup kept alongside
/// the list.
#[derive(Debug)]
pub struct RecencyList<V> {
    nodes: Vec<Node<V>>,
    index: HashMap<String, usize>,
    free: Vec<usize>,
}

impl<V> RecencyList<V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel(), Node::sentinel()],
            index: HashMap::new(),
            free: Vec::new(),
        }
    }

    // == Touch ==
    /// Promotes `key` to the most recent position and returns its value.
    ///
    /// Absent keys are left alone and yield `None`.
    pub fn touch(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.unlink(idx);
        self.link_back(idx);
        self.nodes[idx].value.as_ref()
    }

    // == Put ==
    /// Inserts `key` at the most recent position.
    ///
    /// An existing node for `key` is dropped first, so the value is replaced
    /// and recency reset. Returns the replaced value.
    pub fn put(&mut self, key: String, value: V) -> Option<V> {
        let previous = self.remove(&key);
        let idx = self.alloc(key.clone(), value);
        self.link_back(idx);
        self.index.insert(key, idx);
        previous
    }

    // == Remove ==
    /// Removes `key` and returns its value. No-op for absent keys.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let idx = self.index.remove(key)?;
        self.unlink(idx);
        self.release(idx).map(|(_, value)| value)
    }

    // == Pop Least Recent ==
    /// Removes and returns the least recently touched node.
    pub fn pop_least_recent(&mut self) -> Option<(String, V)> {
        let idx = self.nodes[HEAD].next;
        if idx == TAIL {
            return None;
        }
        self.unlink(idx);
        let (key, value) = self.release(idx)?;
        self.index.remove(&key);
        Some((key, value))
    }

    // == Peek Least Recent ==
    /// Returns the least recently touched node without removing it.
    pub fn peek_least_recent(&self) -> Option<(&str, &V)> {
        let node = &self.nodes[self.nodes[HEAD].next];
        node.value.as_ref().map(|value| (node.key.as_str(), value))
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.nodes[HEAD].next == TAIL
    }

    // == Length ==
    /// Returns the number of keys in the list.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Contains ==
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    // == Keys ==
    /// Returns keys from least to most recently touched.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.len());
        let mut idx = self.nodes[HEAD].next;
        while idx != TAIL {
            keys.push(self.nodes[idx].key.as_str());
            idx = self.nodes[idx].next;
        }
        keys
    }

    // == Slot Management ==
    fn alloc(&mut self, key: String, value: V) -> usize {
        let node = Node {
            key,
            value: Some(value),
            prev: HEAD,
            next: TAIL,
        };
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) -> Option<(String, V)> {
        let node = &mut self.nodes[idx];
        let key = mem::take(&mut node.key);
        let value = node.value.take()?;
        self.free.push(idx);
        Some((key, value))
    }

    // == Linking ==
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn link_back(&mut self, idx: usize) {
        let last = self.nodes[TAIL].prev;
        self.nodes[idx].prev = last;
        self.nodes[idx].next = TAIL;
        self.nodes[last].next = idx;
        self.nodes[TAIL].prev = idx;
    }
}

impl<V> Default for RecencyList<V> {
    fn default() -> Self {
        Self::new()
    }
}
