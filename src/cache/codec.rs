//! Codec Module
//!
//! The byte-level serializer used by the persistent tier.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::item::Record;
use crate::error::Result;

// == Codec Trait ==
/// Turns persisted records into bytes and back.
///
/// Implementations only move bytes; the type tag inside the record is
/// verified by the cache after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Encodes a record for storage.
    fn encode<V: Serialize>(&self, record: &Record<&V>) -> Result<Vec<u8>>;

    /// Decodes a record previously produced by [`Codec::encode`].
    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Record<V>>;
}

// == JSON Codec ==
/// Default codec storing records as JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<V: Serialize>(&self, record: &Record<&V>) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(record)?)
    }

    fn decode<V: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Record<V>> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::item::CacheItem;
    use crate::error::CacheError;

    #[test]
    fn test_json_codec_round_trip() {
        let item = CacheItem::new(vec![1u8, 2, 3], None);

        let bytes = JsonCodec.encode(&item.to_record()).unwrap();
        let record = JsonCodec.decode::<Vec<u8>>(&bytes).unwrap();

        assert_eq!(CacheItem::from_record(record).unwrap(), item);
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        let result = JsonCodec.decode::<String>(b"\x00\x01 definitely not json");
        assert!(matches!(result, Err(CacheError::Codec(_))));
    }

    #[test]
    fn test_json_codec_rejects_incompatible_value() {
        let item = CacheItem::new("text".to_string(), None);
        let bytes = JsonCodec.encode(&item.to_record()).unwrap();

        assert!(JsonCodec.decode::<Vec<u64>>(&bytes).is_err());
    }
}
