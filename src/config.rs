//! Configuration Module
//!
//! Handles cache sizing and the location of disk cache roots.

use std::env;
use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::{CacheError, Result};

/// Application-scoped folder created inside the platform cache directory.
pub const APP_CACHE_FOLDER: &str = "relical.Cache";

/// Cache name used when none is configured.
pub const DEFAULT_CACHE_NAME: &str = "Default";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the memory tier holds before evicting
    pub memory_capacity: usize,
    /// Explicit disk cache root; overrides the platform default when set
    pub cache_dir: Option<PathBuf>,
    /// Folder name of the disk cache under the platform default root
    pub cache_name: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `RELICAL_MEMORY_CAPACITY` - Memory tier capacity (default: 1000)
    /// - `RELICAL_CACHE_DIR` - Explicit disk cache root (default: unset)
    /// - `RELICAL_CACHE_NAME` - Disk cache folder name (default: "Default")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_capacity: env::var("RELICAL_MEMORY_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.memory_capacity),
            cache_dir: env::var_os("RELICAL_CACHE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            cache_name: env::var("RELICAL_CACHE_NAME")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.cache_name),
        }
    }

    /// Resolves the directory a disk cache built from this config lives in.
    ///
    /// An explicit `cache_dir` is used as-is; otherwise the root is
    /// `<platform cache dir>/relical.Cache/<cache_name>`.
    pub fn disk_root(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(default_cache_root()?.join(&self.cache_name)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_capacity: 1000,
            cache_dir: None,
            cache_name: DEFAULT_CACHE_NAME.to_string(),
        }
    }
}

/// Returns the application-scoped folder inside the platform cache directory.
///
/// The folder itself is created lazily by the disk cache that uses it.
pub fn default_cache_root() -> Result<PathBuf> {
    let base = BaseDirs::new().ok_or(CacheError::MissingCacheRoot)?;
    Ok(base.cache_dir().join(APP_CACHE_FOLDER))
}
