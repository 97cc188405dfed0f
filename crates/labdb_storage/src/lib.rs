//! # labdb storage
//!
//! Byte-store backends for the labdb commit log.
//!
//! Backends are **opaque byte stores**: they can append bytes, read
//! them back by offset, truncate, and sync. They understand nothing
//! about buckets, records, or the commit log format; all of that
//! lives one layer up in `labdb_store`.
//!
//! ## Available backends
//!
//! - [`FileBackend`] - persistent storage using OS file APIs
//! - [`InMemoryBackend`] - for tests and ephemeral stores
//!
//! ## Example
//!
//! ```rust
//! use labdb_storage::{InMemoryBackend, StorageBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello world").unwrap();
//! let data = backend.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
