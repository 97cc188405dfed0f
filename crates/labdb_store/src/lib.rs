//! # labdb store
//!
//! An embedded, transactional bucket store.
//!
//! The store's only primitives are nested namespaces ("buckets") and
//! flat byte key/value pairs inside them, the shape document layers
//! such as `labdb_metadata` encode structured records into.
//!
//! ## Transactions
//!
//! All access goes through [`Store::view`] (read-only snapshot) and
//! [`Store::update`] (exclusive writer). An error returned from the
//! closure rolls the whole transaction back; a successful `update` is
//! durable before it returns. Readers run against immutable snapshots
//! and are never blocked by the writer.
//!
//! ## Durability
//!
//! Every commit appends one checksummed record holding the encoded
//! bucket tree to a commit log. Opening the store replays the log and
//! keeps the last intact record, discarding a torn tail. Compaction
//! folds the log into a base `SNAPSHOT` file written atomically.
//!
//! ## Example
//!
//! ```rust
//! use labdb_store::{Store, StoreError};
//!
//! let store = Store::open_in_memory().unwrap();
//!
//! store
//!     .update(|tx| {
//!         let bkt = tx.create_bucket_if_not_exists(b"widgets")?;
//!         bkt.put(b"w1", b"blue")?;
//!         Ok::<_, StoreError>(())
//!     })
//!     .unwrap();
//!
//! store
//!     .view(|tx| {
//!         let bkt = tx.bucket(b"widgets").expect("bucket exists");
//!         assert_eq!(bkt.get(b"w1"), Some(&b"blue"[..]));
//!         Ok::<_, StoreError>(())
//!     })
//!     .unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
mod config;
mod dir;
mod error;
mod log;
mod snapshot;
mod store;

pub use bucket::{Bucket, EntryRef};
pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use store::{ReadTransaction, Store, WriteTransaction};
