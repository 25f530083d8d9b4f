//! Disk Cache Module
//!
//! Persistent cache combining a [`FileStore`] with a [`MemoryStore`] layer.
//!
//! Writes go to disk first and reach memory only once durable. Reads try
//! memory first and fall back to disk without promoting the result.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cache::codec::{Codec, JsonCodec};
use crate::cache::files::{self, FileStore};
use crate::cache::item::CacheItem;
use crate::cache::queue::SerialQueue;
use crate::cache::store::{Lookup, MemoryStore};
use crate::cache::{AsynchronousCache, CacheStats, Cacheable, Completion};
use crate::config::Config;
use crate::error::{CacheError, Result};

const QUEUE_LABEL: &str = "relical.DiskCacheQueue";

/// State owned by the disk cache worker.
struct Tiers<C> {
    memory: MemoryStore,
    files: FileStore<C>,
}

// == Disk Cache ==
/// A filesystem-backed persistent cache with an in-memory layer for fast
/// repeated access.
pub struct DiskCache<C = JsonCodec> {
    root: Arc<PathBuf>,
    queue: SerialQueue<Tiers<C>>,
}

impl<C> Clone for DiskCache<C> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            queue: self.queue.clone(),
        }
    }
}

impl DiskCache<JsonCodec> {
    // == Constructors ==
    /// Opens a cache rooted at `root`, creating the directory if needed.
    ///
    /// Fails with [`CacheError::Configuration`] when the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_codec(root, Config::default().memory_capacity, JsonCodec)
    }

    /// Opens the cache called `cache_name` inside the platform cache directory.
    pub fn named(cache_name: &str) -> Result<Self> {
        Self::from_config(&Config {
            cache_name: cache_name.to_string(),
            ..Config::default()
        })
    }

    /// Opens a cache at the root and with the memory capacity from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_codec(config.disk_root()?, config.memory_capacity, JsonCodec)
    }
}

impl<C: Codec> DiskCache<C> {
    /// Opens a cache persisting records with `codec`.
    ///
    /// # Arguments
    /// * `root` - Cache directory, created with its parents if absent
    /// * `memory_capacity` - Maximum entries held by the memory layer
    /// * `codec` - Serializer for persisted records
    pub fn with_codec(root: impl Into<PathBuf>, memory_capacity: usize, codec: C) -> Result<Self> {
        let files = FileStore::open(root.into(), codec)?;
        let root = files.root().to_path_buf();
        let tiers = Tiers {
            memory: MemoryStore::new(memory_capacity),
            files,
        };
        let queue = SerialQueue::spawn(QUEUE_LABEL, tiers)?;

        info!(root = %root.display(), memory_capacity, "disk cache opened");
        Ok(Self {
            root: Arc::new(root),
            queue,
        })
    }

    /// The cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds (or would hold) the entry for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        files::path_for(&self.root, key)
    }

    // == Purge Memory ==
    /// Clears the in-memory layer only; later reads load from disk.
    pub fn purge_memory(&self) -> Completion<()> {
        self.queue.submit(|tiers| {
            tiers.memory.clear();
            debug!("memory layer purged");
        })
    }

    /// Snapshot of the memory layer's counters.
    pub fn stats(&self) -> Completion<CacheStats> {
        self.queue.submit(|tiers| tiers.memory.stats())
    }
}

impl<C: Codec> AsynchronousCache for DiskCache<C> {
    fn set_with_expiration<V: Cacheable>(
        &self,
        key: &str,
        value: V,
        expiration_at: Option<DateTime<Utc>>,
    ) -> Completion<bool> {
        let key = key.to_string();
        self.queue.submit(move |tiers| {
            let item = CacheItem::new(value, expiration_at);
            match tiers.files.persist(&key, &item) {
                Ok(()) => {
                    tiers.memory.insert(key, item.into_erased());
                    true
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "failed to persist cache item");
                    false
                }
            }
        })
    }

    fn get<V: Cacheable>(&self, key: &str) -> Completion<Option<V>> {
        let key = key.to_string();
        self.queue.submit(move |tiers| match tiers.memory.lookup::<V>(&key) {
            Lookup::Hit(value) => Some(value),
            Lookup::Expired => None,
            Lookup::Miss => load(&tiers.files, &key),
        })
    }

    fn remove(&self, key: &str) -> Completion<bool> {
        let key = key.to_string();
        self.queue.submit(move |tiers| {
            tiers.memory.remove(&key);
            match tiers.files.delete(&key) {
                Ok(()) => true,
                Err(err) => {
                    warn!(key = %key, error = %err, "failed to delete cache item");
                    false
                }
            }
        })
    }

    fn remove_all(&self) -> Completion<bool> {
        self.queue.submit(|tiers| {
            tiers.memory.clear();
            match tiers.files.reset() {
                Ok(()) => true,
                Err(err) => {
                    warn!(root = %tiers.files.root().display(), error = %err, "failed to reset cache directory");
                    false
                }
            }
        })
    }
}

/// Reads a fresh value for `key` from disk; every failure reads as absent.
fn load<C: Codec, V: Cacheable>(files: &FileStore<C>, key: &str) -> Option<V> {
    match files.retrieve::<V>(key) {
        Ok(Some(item)) if item.is_expired() => {
            debug!(key, "disk entry expired");
            None
        }
        Ok(Some(item)) => Some(item.into_value()),
        Ok(None) => None,
        Err(err @ CacheError::TypeMismatch { .. }) => {
            debug!(key, error = %err, "disk entry holds another type");
            None
        }
        Err(err) => {
            warn!(key, error = %err, "failed to load cache item");
            None
        }
    }
}
