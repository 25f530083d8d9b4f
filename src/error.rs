//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror. Only construction errors
//! reach callers; operation failures are logged and reported as plain data.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The cache root directory could not be created
    #[error("Failed to create cache directory at {}: {source}", .path.display())]
    Configuration {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No platform cache directory is available to derive a default root
    #[error("No platform cache directory available")]
    MissingCacheRoot,

    /// The worker thread backing a cache could not be started
    #[error("Failed to start cache worker {label}: {source}")]
    Worker {
        label: String,
        #[source]
        source: io::Error,
    },

    /// A stored record could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// A stored record holds a value of a different type than requested
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Filesystem failure in the persistent tier
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Codec(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
