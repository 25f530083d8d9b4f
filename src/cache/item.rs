//! Cache Item Module
//!
//! Defines the immutable envelope around a cached value and the record shape
//! it takes on disk.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Cacheable;
use crate::error::{CacheError, Result};

/// Type-erased value held by the memory tier.
pub(crate) type AnyValue = Arc<dyn Any + Send + Sync>;

// == Cache Item ==
/// A cached value with creation and optional expiration metadata.
///
/// Expiration is evaluated against the wall clock on every query, so the
/// same item turns from fresh to expired without being mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheItem<V> {
    value: V,
    created_at: DateTime<Utc>,
    expiration_at: Option<DateTime<Utc>>,
}

impl<V> CacheItem<V> {
    // == Constructor ==
    /// Creates a new item stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expiration_at` - Optional point in time after which the item is stale
    pub fn new(value: V, expiration_at: Option<DateTime<Utc>>) -> Self {
        Self {
            value,
            created_at: Utc::now(),
            expiration_at,
        }
    }

    /// The cached value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the item, returning the cached value.
    pub fn into_value(self) -> V {
        self.value
    }

    /// When the item was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the item expires, `None` if it never does.
    pub fn expiration_at(&self) -> Option<DateTime<Utc>> {
        self.expiration_at
    }

    // == Is Expired ==
    /// Checks if the expiration time lies strictly in the past.
    ///
    /// Items without an expiration time never expire.
    pub fn is_expired(&self) -> bool {
        match self.expiration_at {
            Some(expiration) => expiration < Utc::now(),
            None => false,
        }
    }

    /// Borrowing view used to encode the item.
    pub fn to_record(&self) -> Record<&V>
    where
        V: Cacheable,
    {
        Record {
            type_tag: V::type_tag(),
            value: &self.value,
            created_at: self.created_at,
            expiration_at: self.expiration_at,
        }
    }

    /// Rebuilds an item from a decoded record.
    ///
    /// Fails with [`CacheError::TypeMismatch`] when the record was written for
    /// a different value type than `V`.
    pub fn from_record(record: Record<V>) -> Result<Self>
    where
        V: Cacheable,
    {
        let expected = V::type_tag();
        if record.type_tag != expected {
            return Err(CacheError::TypeMismatch {
                expected,
                found: record.type_tag,
            });
        }

        Ok(Self {
            value: record.value,
            created_at: record.created_at,
            expiration_at: record.expiration_at,
        })
    }

    /// Erases the value type so the item can live in the memory tier.
    pub(crate) fn into_erased(self) -> CacheItem<AnyValue>
    where
        V: Send + Sync + 'static,
    {
        CacheItem {
            value: Arc::new(self.value),
            created_at: self.created_at,
            expiration_at: self.expiration_at,
        }
    }
}

impl CacheItem<AnyValue> {
    /// Returns a copy of the value if it was stored as a `V`.
    pub(crate) fn downcast_value<V: Clone + 'static>(&self) -> Option<V> {
        self.value.downcast_ref::<V>().cloned()
    }
}

// == Record ==
/// Self-describing shape of a persisted item.
///
/// `type_tag` holds [`Cacheable::type_tag`] of the value type.
/// `value` and `created_at` are required; a record without `expiration_at`
/// never expires.
#[derive(Debug, Serialize, Deserialize)]
pub struct Record<T> {
    pub type_tag: String,
    pub value: T,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_at: Option<DateTime<Utc>>,
}
