//! In-Memory Cache Module
//!
//! Transient cache backed only by a [`MemoryStore`].

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::cache::item::CacheItem;
use crate::cache::queue::SerialQueue;
use crate::cache::store::{Lookup, MemoryStore};
use crate::cache::{AsynchronousCache, CacheStats, Cacheable, Completion};
use crate::config::Config;
use crate::error::Result;

const QUEUE_LABEL: &str = "relical.InMemoryCacheQueue";

// == In-Memory Cache ==
/// A transient cache whose entries live only as long as the process.
///
/// Entries may be evicted at any time to respect the configured capacity.
#[derive(Clone)]
pub struct InMemoryCache {
    queue: SerialQueue<MemoryStore>,
}

impl InMemoryCache {
    /// Creates a cache with the default capacity.
    pub fn new() -> Result<Self> {
        Self::from_config(&Config::default())
    }

    /// Creates a cache sized from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_capacity(config.memory_capacity)
    }

    /// Creates a cache holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let queue = SerialQueue::spawn(QUEUE_LABEL, MemoryStore::new(capacity))?;
        info!(capacity, "in-memory cache created");
        Ok(Self { queue })
    }

    /// Snapshot of the store's counters.
    pub fn stats(&self) -> Completion<CacheStats> {
        self.queue.submit(|store| store.stats())
    }
}

impl AsynchronousCache for InMemoryCache {
    fn set_with_expiration<V: Cacheable>(
        &self,
        key: &str,
        value: V,
        expiration_at: Option<DateTime<Utc>>,
    ) -> Completion<bool> {
        let key = key.to_string();
        self.queue.submit(move |store| {
            debug!(key = %key, "set");
            store.insert(key, CacheItem::new(value, expiration_at).into_erased());
            true
        })
    }

    fn get<V: Cacheable>(&self, key: &str) -> Completion<Option<V>> {
        let key = key.to_string();
        self.queue.submit(move |store| match store.lookup::<V>(&key) {
            Lookup::Hit(value) => Some(value),
            Lookup::Expired | Lookup::Miss => None,
        })
    }

    fn remove(&self, key: &str) -> Completion<bool> {
        let key = key.to_string();
        self.queue.submit(move |store| store.remove(&key))
    }

    fn remove_all(&self) -> Completion<bool> {
        self.queue.submit(|store| {
            store.clear();
            true
        })
    }
}
