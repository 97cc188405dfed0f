//! Error types for the bucket store.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the bucket store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] labdb_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Tried to create a bucket that already exists.
    #[error("bucket already exists: {name:?}")]
    BucketExists {
        /// Name of the bucket.
        name: String,
    },

    /// Tried to delete a bucket that does not exist.
    #[error("bucket not found: {name:?}")]
    BucketNotFound {
        /// Name of the bucket.
        name: String,
    },

    /// A leaf operation hit a bucket, or a bucket operation hit a leaf.
    #[error("incompatible value at key {key:?}")]
    IncompatibleValue {
        /// The offending key.
        key: String,
    },

    /// An empty key or bucket name was supplied.
    #[error("key required")]
    KeyRequired,

    /// The on-disk data is not a valid store.
    #[error("store corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// The open request conflicts with the state on disk.
    #[error("invalid store: {message}")]
    InvalidFormat {
        /// Description of the conflict.
        message: String,
    },

    /// Another process holds the store's lock.
    #[error("store locked: another process has exclusive access")]
    Locked,

    /// The store has been closed.
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates an invalid-format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub(crate) fn bucket_exists(name: &[u8]) -> Self {
        Self::BucketExists {
            name: String::from_utf8_lossy(name).into_owned(),
        }
    }

    pub(crate) fn bucket_not_found(name: &[u8]) -> Self {
        Self::BucketNotFound {
            name: String::from_utf8_lossy(name).into_owned(),
        }
    }

    pub(crate) fn incompatible_value(key: &[u8]) -> Self {
        Self::IncompatibleValue {
            key: String::from_utf8_lossy(key).into_owned(),
        }
    }
}
