//! Generic record lifecycle shared by every document kind.
//!
//! A [`Namespace`] owns one top-level bucket and runs the same create,
//! get, list, update and delete routine for any [`Document`], so new
//! record kinds only have to describe their field layout.

use std::marker::PhantomData;

use chrono::{DateTime, Duration, Utc};
use labdb_store::{EntryRef, Store, StoreError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::{self, Document};
use crate::error::{MetadataError, MetadataResult};
use crate::keys::KEY_ID;
use crate::timestamps;

/// A persisted document together with its bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<D> {
    /// Caller-chosen identifier, unique within the namespace.
    pub id: String,
    /// The document payload.
    pub document: D,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

/// One top-level bucket of records sharing a document type.
pub struct Namespace<D> {
    bucket: &'static [u8],
    entity: &'static str,
    _document: PhantomData<D>,
}

impl<D: Document> Namespace<D> {
    /// Creates a namespace over the given top-level bucket.
    ///
    /// `entity` is the singular record kind used in error messages,
    /// e.g. `"scenario"`.
    pub const fn new(bucket: &'static [u8], entity: &'static str) -> Self {
        Self {
            bucket,
            entity,
            _document: PhantomData,
        }
    }

    /// Creates a new record and returns it as persisted.
    ///
    /// Fails with [`MetadataError::AlreadyExists`] when the identifier
    /// is taken.
    pub fn create(&self, store: &Store, id: &str, document: &D) -> MetadataResult<Record<D>> {
        if id.is_empty() {
            return Err(MetadataError::invalid_argument(format!(
                "{} id required for create",
                self.entity
            )));
        }
        let record = store.update(|tx| {
            let namespace = tx.create_bucket_if_not_exists(self.bucket)?;
            let bucket = match namespace.create_bucket(id.as_bytes()) {
                Ok(bucket) => bucket,
                Err(StoreError::BucketExists { .. }) => {
                    return Err(MetadataError::already_exists(self.entity, id));
                }
                Err(err) => return Err(err.into()),
            };
            let now = Utc::now();
            bucket.put(KEY_ID, id.as_bytes())?;
            timestamps::write_timestamps(bucket, now, now)?;
            document.write(bucket)?;
            self.decode(id, bucket)
        });
        let record = record.map_err(|err| err.with_entity(self.entity, id))?;
        debug!(entity = self.entity, id, "record created");
        Ok(record)
    }

    /// Fetches one record by identifier.
    pub fn get(&self, store: &Store, id: &str) -> MetadataResult<Record<D>> {
        store
            .view(|tx| {
                let namespace = tx
                    .bucket(self.bucket)
                    .ok_or_else(|| MetadataError::not_found(self.entity, id))?;
                let bucket = namespace
                    .bucket(id.as_bytes())
                    .ok_or_else(|| MetadataError::not_found(self.entity, id))?;
                self.decode(id, bucket)
            })
            .map_err(|err| err.with_entity(self.entity, id))
    }

    /// Lists every record in the namespace, ordered by identifier.
    pub fn list(&self, store: &Store) -> MetadataResult<Vec<Record<D>>> {
        store.view(|tx| {
            let Some(namespace) = tx.bucket(self.bucket) else {
                return Ok(Vec::new());
            };
            let mut records = Vec::with_capacity(namespace.len());
            for (key, entry) in namespace.iter() {
                let EntryRef::Bucket(bucket) = entry else {
                    continue;
                };
                let id = String::from_utf8_lossy(key).into_owned();
                let record = self
                    .decode(&id, bucket)
                    .map_err(|err| err.with_entity(self.entity, &id))?;
                records.push(record);
            }
            Ok(records)
        })
    }

    /// Rewrites an existing record's document and returns the result.
    ///
    /// The creation timestamp is preserved from the store and the
    /// modification timestamp always advances, even against a clock
    /// that has not ticked or has stepped backwards.
    pub fn update(&self, store: &Store, record: &Record<D>) -> MetadataResult<Record<D>> {
        if record.id.is_empty() {
            return Err(MetadataError::invalid_argument(format!(
                "{} id required for update",
                self.entity
            )));
        }
        let id = record.id.as_str();
        let updated = store.update(|tx| {
            let namespace = tx
                .bucket_mut(self.bucket)
                .ok_or_else(|| MetadataError::not_found(self.entity, id))?;
            let bucket = namespace
                .bucket_mut(id.as_bytes())
                .ok_or_else(|| MetadataError::not_found(self.entity, id))?;
            let (created_at, last_updated) = timestamps::read_timestamps(bucket)?;
            let mut now = Utc::now();
            if now <= last_updated {
                now = last_updated + Duration::nanoseconds(1);
            }
            timestamps::write_timestamps(bucket, created_at, now)?;
            record.document.write(bucket)?;
            self.decode(id, bucket)
        });
        let updated = updated.map_err(|err| err.with_entity(self.entity, id))?;
        debug!(entity = self.entity, id, "record updated");
        Ok(updated)
    }

    /// Deletes one record by identifier.
    pub fn delete(&self, store: &Store, id: &str) -> MetadataResult<()> {
        store.update(|tx| {
            let namespace = tx
                .bucket_mut(self.bucket)
                .ok_or_else(|| MetadataError::not_found(self.entity, id))?;
            match namespace.delete_bucket(id.as_bytes()) {
                Err(StoreError::BucketNotFound { .. }) => {
                    Err(MetadataError::not_found(self.entity, id))
                }
                other => other.map_err(MetadataError::from),
            }
        })?;
        debug!(entity = self.entity, id, "record deleted");
        Ok(())
    }

    fn decode(&self, id: &str, bucket: &labdb_store::Bucket) -> MetadataResult<Record<D>> {
        let (created_at, updated_at) = timestamps::read_timestamps(bucket)?;
        let document = D::read(bucket)?;
        let id = codec::text(bucket, KEY_ID)?.unwrap_or_else(|| id.to_string());
        Ok(Record {
            id,
            document,
            created_at,
            updated_at,
        })
    }
}
