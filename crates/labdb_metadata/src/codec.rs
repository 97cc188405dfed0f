//! Field encoding between documents and bucket entries.
//!
//! Scalars are UTF-8 leaves, string maps are sub-buckets of leaves.
//! Map sub-buckets are replaced wholesale on every write: the old
//! sub-bucket is dropped and a fresh one is created only when the map
//! still has live entries, so deleted keys never linger and an empty
//! map leaves no sub-bucket behind.

use std::collections::BTreeMap;

use labdb_store::{Bucket, EntryRef};

use crate::error::{MetadataError, MetadataResult};

/// A structured document persisted as one record bucket.
///
/// Implementations own the layout of their record bucket below the
/// identifier and timestamp leaves, which the namespace manages.
pub trait Document: Sized {
    /// Writes the document's fields into the record bucket.
    fn write(&self, bucket: &mut Bucket) -> MetadataResult<()>;

    /// Reads the document's fields back from the record bucket.
    fn read(bucket: &Bucket) -> MetadataResult<Self>;
}

/// Stores a scalar string leaf.
pub fn put_text(bucket: &mut Bucket, key: &[u8], value: &str) -> MetadataResult<()> {
    bucket.put(key, value.as_bytes())?;
    Ok(())
}

/// Loads a scalar string leaf, or `None` when the leaf is absent.
pub fn text(bucket: &Bucket, key: &[u8]) -> MetadataResult<Option<String>> {
    match bucket.get(key) {
        None => Ok(None),
        Some(raw) => String::from_utf8(raw.to_vec()).map(Some).map_err(|_| {
            MetadataError::corrupt(format!(
                "leaf {:?} is not UTF-8",
                String::from_utf8_lossy(key)
            ))
        }),
    }
}

/// Replaces the named sub-bucket with the entries of `map`.
///
/// Entries with empty values are pruned, and when nothing survives the
/// pruning no sub-bucket is created at all.
pub fn write_string_map(
    bucket: &mut Bucket,
    name: &[u8],
    map: &BTreeMap<String, String>,
) -> MetadataResult<()> {
    if bucket.bucket(name).is_some() {
        bucket.delete_bucket(name)?;
    }
    let live: Vec<(&String, &String)> = map.iter().filter(|(_, v)| !v.is_empty()).collect();
    if live.is_empty() {
        return Ok(());
    }
    let inner = bucket.create_bucket(name)?;
    for (key, value) in live {
        inner.put(key.as_bytes(), value.as_bytes())?;
    }
    Ok(())
}

/// Loads the named sub-bucket as a string map.
///
/// An absent sub-bucket decodes to an empty map. Nested buckets inside
/// the map are skipped rather than rejected.
pub fn read_string_map(bucket: &Bucket, name: &[u8]) -> MetadataResult<BTreeMap<String, String>> {
    let Some(inner) = bucket.bucket(name) else {
        return Ok(BTreeMap::new());
    };
    let mut map = BTreeMap::new();
    for (key, entry) in inner.iter() {
        let EntryRef::Value(raw) = entry else {
            continue;
        };
        let key = String::from_utf8(key.to_vec())
            .map_err(|_| MetadataError::corrupt("map key is not UTF-8"))?;
        let value = String::from_utf8(raw.to_vec())
            .map_err(|_| MetadataError::corrupt(format!("map value for {key:?} is not UTF-8")))?;
        map.insert(key, value);
    }
    Ok(map)
}
