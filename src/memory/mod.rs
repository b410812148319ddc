use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::wire::CodeBundle;

/// Digest of the requirement text a bundle was generated for.
pub fn key_for(requirement: &str) -> String {
    blake3::hash(requirement.as_bytes()).to_hex().to_string()
}

#[derive(Debug, Default)]
struct Slots {
    order: VecDeque<String>,
    entries: HashMap<String, CodeBundle>,
}

/// Bounded store of recent generations, evicted in insertion order.
///
/// Reads never reorder entries. Writing an existing key replaces the bundle
/// and counts as a new insertion, so it becomes the most recent entry.
/// Every operation takes the lock on its own; a caller that reads and later
/// writes is not isolated from other callers in between.
#[derive(Debug)]
pub struct MemoryCache {
    capacity: usize,
    slots: Mutex<Slots>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, slots: Mutex::new(Slots::default()) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.lock().entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<CodeBundle> {
        self.slots.lock().entries.get(key).cloned()
    }

    /// The most recently inserted bundle, regardless of relevance.
    pub fn latest(&self) -> Option<CodeBundle> {
        let slots = self.slots.lock();
        slots.order.back().and_then(|k| slots.entries.get(k)).cloned()
    }

    /// Inserts and returns the keys evicted to stay within capacity.
    pub fn put(&self, key: String, bundle: CodeBundle) -> Vec<String> {
        if self.capacity == 0 {
            return Vec::new();
        }
        let mut slots = self.slots.lock();
        if slots.entries.insert(key.clone(), bundle).is_some() {
            slots.order.retain(|k| k != &key);
        }
        slots.order.push_back(key);

        let mut evicted = Vec::new();
        while slots.order.len() > self.capacity {
            if let Some(old) = slots.order.pop_front() {
                slots.entries.remove(&old);
                evicted.push(old);
            }
        }
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "evicted oldest memory entries");
        }
        evicted
    }

    pub fn evict_oldest(&self) -> Option<String> {
        let mut slots = self.slots.lock();
        let old = slots.order.pop_front()?;
        slots.entries.remove(&old);
        Some(old)
    }

    /// Stores `bundle` under the digest of `requirement`.
    pub fn remember(&self, requirement: &str, bundle: CodeBundle) -> Vec<String> {
        self.put(key_for(requirement), bundle)
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock();
        slots.order.clear();
        slots.entries.clear();
    }
}
