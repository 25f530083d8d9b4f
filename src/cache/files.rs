//! File Store Module
//!
//! Persistent tier of the disk cache: one file per key under a root directory.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::cache::codec::Codec;
use crate::cache::item::CacheItem;
use crate::cache::Cacheable;
use crate::error::{CacheError, Result};

/// Prefix of every cache file name.
pub const FILE_PREFIX: &str = "Cache";

/// Extension of every cache file name.
pub const FILE_SUFFIX: &str = "tmp";

// == File Store ==
/// File-per-key store rooted at a directory.
///
/// File names derive from a BLAKE3 digest of the key, so a key maps to the
/// same file across processes and distinct keys never share a file.
#[derive(Debug)]
pub(crate) struct FileStore<C> {
    root: PathBuf,
    codec: C,
}

impl<C: Codec> FileStore<C> {
    /// Opens a store at `root`, creating the directory and its parents.
    ///
    /// The root is normalised first, so `cache/` and `cache` name the same store.
    pub(crate) fn open(root: PathBuf, codec: C) -> Result<Self> {
        let root: PathBuf = root.components().collect();
        fs::create_dir_all(&root).map_err(|source| CacheError::Configuration {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root, codec })
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    // == Persist ==
    /// Writes `item` to the key's file, replacing any previous file atomically.
    pub(crate) fn persist<V: Cacheable>(&self, key: &str, item: &CacheItem<V>) -> Result<()> {
        let path = path_for(&self.root, key);
        let bytes = self.codec.encode(&item.to_record())?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(&path).map_err(|err| err.error)?;

        debug!(key, path = %path.display(), bytes = bytes.len(), "persisted cache item");
        Ok(())
    }

    // == Retrieve ==
    /// Reads and decodes the key's file.
    ///
    /// Returns `Ok(None)` when no file exists; undecodable files and files
    /// written for another value type are errors.
    pub(crate) fn retrieve<V: Cacheable>(&self, key: &str) -> Result<Option<CacheItem<V>>> {
        let path = path_for(&self.root, key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let record = self.codec.decode::<V>(&bytes)?;
        Ok(Some(CacheItem::from_record(record)?))
    }

    // == Delete ==
    /// Deletes the key's file. A missing file is an error.
    pub(crate) fn delete(&self, key: &str) -> Result<()> {
        fs::remove_file(path_for(&self.root, key))?;
        Ok(())
    }

    // == Reset ==
    /// Empties the root directory.
    ///
    /// An existing root is renamed aside, recreated empty, and only then is
    /// the renamed copy deleted. An interruption leaves either the old data
    /// untouched or an empty root plus a leftover aside copy, which the next
    /// reset removes first.
    pub(crate) fn reset(&self) -> Result<()> {
        let aside = aside_path(&self.root);

        if self.root.exists() {
            if aside.exists() {
                fs::remove_dir_all(&aside)?;
            }
            fs::rename(&self.root, &aside)?;
            fs::create_dir_all(&self.root)?;
            fs::remove_dir_all(&aside)?;
        } else {
            fs::create_dir_all(&self.root)?;
        }

        info!(root = %self.root.display(), "cache directory reset");
        Ok(())
    }
}

/// Location of the file holding `key` under `root`.
pub fn path_for(root: &Path, key: &str) -> PathBuf {
    let digest = blake3::hash(key.as_bytes());
    root.join(format!("{FILE_PREFIX}{}.{FILE_SUFFIX}", digest.to_hex()))
}

/// Sibling path the root is moved to while being reset.
///
/// Built from the root's own name so it never lands inside the root.
fn aside_path(root: &Path) -> PathBuf {
    let mut name = root
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("root"));
    name.push(".");
    name.push(FILE_SUFFIX);
    root.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::codec::JsonCodec;
    use chrono::{Duration, Utc};

    fn open_store(dir: &Path) -> FileStore<JsonCodec> {
        FileStore::open(dir.join("root"), JsonCodec).unwrap()
    }

    #[test]
    fn test_open_creates_nested_root() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("a").join("b").join("c");

        FileStore::open(root.clone(), JsonCodec).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_open_fails_when_root_is_a_file() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();

        let result = FileStore::open(blocker.join("root"), JsonCodec);
        assert!(matches!(result, Err(CacheError::Configuration { .. })));
    }

    #[test]
    fn test_path_is_stable_and_prefixed() {
        let root = Path::new("/cache");
        let path = path_for(root, "dictionary");
        let expected = format!("Cache{}.tmp", blake3::hash(b"dictionary").to_hex());

        assert_eq!(path, root.join(expected));
        assert_eq!(path, path_for(root, "dictionary"));
        assert_ne!(path, path_for(root, "blob"));
    }

    #[test]
    fn test_persist_then_retrieve() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        let item = CacheItem::new(vec![0xAAu8, 0xBB, 0xCC], None);

        store.persist("blob", &item).unwrap();
        let read_back = store.retrieve::<Vec<u8>>("blob").unwrap().expect("cache hit");

        assert_eq!(read_back, item);
    }

    #[test]
    fn test_persist_replaces_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());

        store.persist("k", &CacheItem::new(1u32, None)).unwrap();
        store.persist("k", &CacheItem::new(2u32, None)).unwrap();

        let item = store.retrieve::<u32>("k").unwrap().unwrap();
        assert_eq!(*item.value(), 2);
        assert_eq!(fs::read_dir(store.root()).unwrap().count(), 1);
    }

    #[test]
    fn test_retrieve_keeps_expiration() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        let item = CacheItem::new("v".to_string(), Some(Utc::now() - Duration::seconds(1)));

        store.persist("k", &item).unwrap();
        let read_back = store.retrieve::<String>("k").unwrap().unwrap();

        assert!(read_back.is_expired());
    }

    #[test]
    fn test_retrieve_missing_is_none() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());

        assert!(store.retrieve::<String>("does::not::exist").unwrap().is_none());
    }

    #[test]
    fn test_retrieve_other_type_fails() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        store.persist("n", &CacheItem::new(42u64, None)).unwrap();

        assert!(matches!(
            store.retrieve::<u32>("n"),
            Err(CacheError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_retrieve_corrupted_file_fails() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        fs::write(path_for(store.root(), "k"), b"garbage").unwrap();

        assert!(matches!(
            store.retrieve::<String>("k"),
            Err(CacheError::Codec(_))
        ));
    }

    #[test]
    fn test_delete_twice() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        store.persist("k", &CacheItem::new(1u8, None)).unwrap();

        assert!(store.delete("k").is_ok());
        assert!(store.delete("k").is_err());
    }

    #[test]
    fn test_reset_empties_root() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        store.persist("a", &CacheItem::new(1u8, None)).unwrap();
        store.persist("b", &CacheItem::new(2u8, None)).unwrap();

        store.reset().unwrap();

        assert!(store.root().is_dir());
        assert_eq!(fs::read_dir(store.root()).unwrap().count(), 0);
        assert!(!aside_path(store.root()).exists());
    }

    #[test]
    fn test_open_normalises_trailing_separator() {
        let temp = tempfile::tempdir().unwrap();
        let raw = format!("{}/Cache/", temp.path().display());

        let store = FileStore::open(PathBuf::from(raw), JsonCodec).unwrap();

        assert_eq!(store.root(), temp.path().join("Cache"));
        assert_eq!(aside_path(store.root()), temp.path().join("Cache.tmp"));
    }

    #[test]
    fn test_reset_with_trailing_separator_root() {
        let temp = tempfile::tempdir().unwrap();
        let raw = format!("{}/Cache/", temp.path().display());
        let store = FileStore::open(PathBuf::from(raw), JsonCodec).unwrap();
        store.persist("a", &CacheItem::new(1u8, None)).unwrap();

        store.reset().unwrap();

        assert!(store.root().is_dir());
        assert_eq!(fs::read_dir(store.root()).unwrap().count(), 0);
        assert!(store.retrieve::<u8>("a").unwrap().is_none());
    }

    #[test]
    fn test_reset_recreates_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        fs::remove_dir_all(store.root()).unwrap();

        store.reset().unwrap();

        assert!(store.root().is_dir());
    }

    #[test]
    fn test_reset_clears_leftover_aside_copy() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        let aside = aside_path(store.root());
        fs::create_dir_all(&aside).unwrap();
        fs::write(aside.join("stale"), b"old").unwrap();
        store.persist("a", &CacheItem::new(1u8, None)).unwrap();

        store.reset().unwrap();

        assert!(!aside.exists());
        assert_eq!(fs::read_dir(store.root()).unwrap().count(), 0);
    }
}
