//! Scenario metadata on top of the labdb bucket store.
//!
//! This crate maps structured scenario documents onto nested buckets:
//! each record is one bucket under a namespace bucket, holding its
//! identifier, RFC 3339 timestamps and the document's own sub-buckets.
//! The generic [`Namespace`] runs the shared create/get/list/update/
//! delete routine; [`ScenarioDefinition`] describes the one document
//! kind shipped here.
//!
//! ```
//! use labdb_metadata::{MetadataDb, ScenarioDefinition};
//!
//! let db = MetadataDb::open_in_memory()?;
//! let mut definition = ScenarioDefinition::default();
//! definition.seed.insert("dataset".into(), "(0,3)".into());
//!
//! let scenario = db.create_scenario("baseline", &definition)?;
//! assert_eq!(db.get_scenario("baseline")?, scenario);
//! # Ok::<(), labdb_metadata::MetadataError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
mod db;
mod error;
pub mod keys;
mod record;
mod scenario;
pub mod timestamps;

pub use db::MetadataDb;
pub use error::{MetadataError, MetadataResult};
pub use record::{Namespace, Record};
pub use scenario::{
    ObjectDefinition, Scenario, ScenarioDefinition, OBJECT_CONTAINER_IMAGE,
};

pub use codec::Document;
