//! Relical - A small tiered cache
//!
//! Uniform asynchronous key/value caching with two implementations: a
//! transient [`InMemoryCache`] and a persistent [`DiskCache`] that keeps an
//! in-memory layer for fast repeated access.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{AsynchronousCache, CacheItem, CacheStats, Cacheable, Completion, DiskCache, InMemoryCache};
pub use config::Config;
pub use error::{CacheError, Result};
