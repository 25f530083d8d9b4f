//! Cache Module
//!
//! Asynchronous key/value caches: a transient [`InMemoryCache`] and a
//! persistent [`DiskCache`] with an in-memory layer for repeated access.

mod cacheable;
mod codec;
mod disk;
mod files;
mod item;
mod memory;
mod queue;
mod stats;
mod store;


use chrono::{DateTime, Utc};

// Re-export public types
pub use cacheable::Cacheable;
pub use codec::{Codec, JsonCodec};
pub use disk::DiskCache;
pub use files::{path_for, FILE_PREFIX, FILE_SUFFIX};
pub use item::{CacheItem, Record};
pub use memory::InMemoryCache;
pub use queue::Completion;
pub use stats::CacheStats;
pub(crate) use store::MemoryStore;

// == Asynchronous Cache ==
/// Common contract of every cache.
///
/// Each call queues the operation on the cache's worker and returns at once;
/// operations on one cache complete in the order they were issued. The value
/// type is chosen per call, and asking for a key with the wrong type yields
/// `None`.
pub trait AsynchronousCache {
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// Resolves to `false` only when the value could not be persisted.
    fn set_with_expiration<V: Cacheable>(
        &self,
        key: &str,
        value: V,
        expiration_at: Option<DateTime<Utc>>,
    ) -> Completion<bool>;

    /// Stores `value` under `key` without an expiration.
    fn set<V: Cacheable>(&self, key: &str, value: V) -> Completion<bool> {
        self.set_with_expiration(key, value, None)
    }

    /// Resolves to the value for `key` unless it is missing, expired or of another type.
    fn get<V: Cacheable>(&self, key: &str) -> Completion<Option<V>>;

    /// Removes the entry for `key`.
    fn remove(&self, key: &str) -> Completion<bool>;

    /// Removes every entry. Resolves to whether the underlying storage was reset.
    fn remove_all(&self) -> Completion<bool>;
}
