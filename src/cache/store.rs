//! Memory Store Module
//!
//! Best-effort memory tier shared by both cache kinds: type-erased items in
//! an LRU-ordered map.

use hashlink::LruCache;
use tracing::trace;

use crate::cache::item::{AnyValue, CacheItem};
use crate::cache::CacheStats;

/// Outcome of looking a key up in memory.
#[derive(Debug, PartialEq)]
pub(crate) enum Lookup<V> {
    /// Present, fresh and of the requested type
    Hit(V),
    /// Present with the requested type but past its expiration
    Expired,
    /// Absent, or stored under a different value type
    Miss,
}

// == Memory Store ==
/// Memory tier that may drop entries at any time to stay within capacity.
///
/// Callers must treat every absence as normal: an entry can be evicted as
/// soon as newer entries push it out.
pub struct MemoryStore {
    entries: LruCache<String, CacheItem<AnyValue>>,
    stats: CacheStats,
    max_entries: usize,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store holding at most `max_entries` items.
    ///
    /// A capacity of zero is raised to one so a fresh write stays readable.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: LruCache::new_unbounded(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Insert ==
    /// Stores an item as the most recently used, replacing any existing item
    /// for the key.
    ///
    /// Evicts the least recently used entry when a new key would exceed capacity.
    pub(crate) fn insert(&mut self, key: String, item: CacheItem<AnyValue>) {
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.max_entries {
                let Some((victim, _)) = self.entries.remove_lru() else {
                    break;
                };
                self.stats.record_eviction();
                trace!(key = %victim, "evicted from memory tier");
            }
        }

        self.entries.insert(key, item);
    }

    // == Lookup ==
    /// Looks up a key as a `V`. Only a hit refreshes the key's recency.
    ///
    /// Expired items are reported but left in place.
    pub(crate) fn lookup<V: Clone + 'static>(&mut self, key: &str) -> Lookup<V> {
        let Some(item) = self.entries.peek(key) else {
            self.stats.record_miss();
            return Lookup::Miss;
        };

        let Some(value) = item.downcast_value::<V>() else {
            self.stats.record_miss();
            return Lookup::Miss;
        };

        if item.is_expired() {
            self.stats.record_miss();
            return Lookup::Expired;
        }

        self.stats.record_hit();
        self.entries.get(key);
        Lookup::Hit(value)
    }

    // == Remove ==
    /// Removes a key, returning whether an item was present.
    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Drops every item. Counters are kept.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
