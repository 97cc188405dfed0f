//! The in-memory bucket tree.
//!
//! A bucket is an ordered map from byte keys to either leaf values or
//! nested buckets, similar to a directory. Iteration order is
//! lexicographic by key, so enumeration is deterministic.

use crate::error::{StoreError, StoreResult};
use std::collections::BTreeMap;

/// One entry inside a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Entry {
    /// A leaf key/value pair.
    Value(Vec<u8>),
    /// A nested bucket.
    Bucket(Bucket),
}

/// A borrowed view of one bucket entry, yielded during iteration.
#[derive(Debug, Clone, Copy)]
pub enum EntryRef<'a> {
    /// A leaf value.
    Value(&'a [u8]),
    /// A nested bucket.
    Bucket(&'a Bucket),
}

/// A nested namespace of leaf key/value pairs and further buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    entries: BTreeMap<Vec<u8>, Entry>,
}

impl Bucket {
    /// Creates an empty bucket.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the leaf value stored at `key`.
    ///
    /// Returns `None` if the key is absent or names a nested bucket.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        match self.entries.get(key) {
            Some(Entry::Value(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Stores a leaf value at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Fails with `KeyRequired` for an empty key and with
    /// `IncompatibleValue` if `key` names a nested bucket.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::KeyRequired);
        }
        if matches!(self.entries.get(key), Some(Entry::Bucket(_))) {
            return Err(StoreError::incompatible_value(key));
        }
        self.entries.insert(key.to_vec(), Entry::Value(value.to_vec()));
        Ok(())
    }

    /// Removes the leaf at `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with `IncompatibleValue` if `key` names a nested bucket;
    /// buckets are removed with [`Bucket::delete_bucket`].
    pub fn delete(&mut self, key: &[u8]) -> StoreResult<()> {
        if matches!(self.entries.get(key), Some(Entry::Bucket(_))) {
            return Err(StoreError::incompatible_value(key));
        }
        self.entries.remove(key);
        Ok(())
    }

    /// Returns the nested bucket named `name`, if present.
    #[must_use]
    pub fn bucket(&self, name: &[u8]) -> Option<&Bucket> {
        match self.entries.get(name) {
            Some(Entry::Bucket(b)) => Some(b),
            _ => None,
        }
    }

    /// Returns the nested bucket named `name` mutably, if present.
    pub fn bucket_mut(&mut self, name: &[u8]) -> Option<&mut Bucket> {
        match self.entries.get_mut(name) {
            Some(Entry::Bucket(b)) => Some(b),
            _ => None,
        }
    }

    /// Creates a nested bucket named `name`.
    ///
    /// # Errors
    ///
    /// Fails with `KeyRequired` for an empty name, `BucketExists` if
    /// the bucket is already present, and `IncompatibleValue` if the
    /// name is taken by a leaf value.
    pub fn create_bucket(&mut self, name: &[u8]) -> StoreResult<&mut Bucket> {
        if name.is_empty() {
            return Err(StoreError::KeyRequired);
        }
        if matches!(self.entries.get(name), Some(Entry::Bucket(_))) {
            return Err(StoreError::bucket_exists(name));
        }
        self.bucket_slot(name)
    }

    /// Creates a nested bucket named `name`, or returns the existing one.
    ///
    /// # Errors
    ///
    /// Fails with `KeyRequired` for an empty name and with
    /// `IncompatibleValue` if the name is taken by a leaf value.
    pub fn create_bucket_if_not_exists(&mut self, name: &[u8]) -> StoreResult<&mut Bucket> {
        if name.is_empty() {
            return Err(StoreError::KeyRequired);
        }
        self.bucket_slot(name)
    }

    /// Inserts an empty bucket at `name` if the slot is vacant, then
    /// hands the slot back as a bucket or fails on a leaf collision.
    fn bucket_slot(&mut self, name: &[u8]) -> StoreResult<&mut Bucket> {
        let entry = self
            .entries
            .entry(name.to_vec())
            .or_insert_with(|| Entry::Bucket(Bucket::new()));
        match entry {
            Entry::Bucket(b) => Ok(b),
            Entry::Value(_) => Err(StoreError::incompatible_value(name)),
        }
    }

    /// Removes the nested bucket named `name` and everything under it.
    ///
    /// # Errors
    ///
    /// Fails with `BucketNotFound` if no such bucket exists and with
    /// `IncompatibleValue` if the name is taken by a leaf value.
    pub fn delete_bucket(&mut self, name: &[u8]) -> StoreResult<()> {
        match self.entries.get(name) {
            Some(Entry::Bucket(_)) => {
                self.entries.remove(name);
                Ok(())
            }
            Some(Entry::Value(_)) => Err(StoreError::incompatible_value(name)),
            None => Err(StoreError::bucket_not_found(name)),
        }
    }

    /// Iterates over all entries in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], EntryRef<'_>)> {
        self.entries.iter().map(|(k, e)| {
            let entry = match e {
                Entry::Value(v) => EntryRef::Value(v.as_slice()),
                Entry::Bucket(b) => EntryRef::Bucket(b),
            };
            (k.as_slice(), entry)
        })
    }

    /// Returns the number of entries (leaves and buckets) in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if this bucket holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &BTreeMap<Vec<u8>, Entry> {
        &self.entries
    }
}
