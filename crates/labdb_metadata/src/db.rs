//! The top-level metadata database handle.

use std::path::Path;

use labdb_store::{Config, Store};

use crate::error::MetadataResult;
use crate::keys::BUCKET_SCENARIOS;
use crate::record::Namespace;
use crate::scenario::{Scenario, ScenarioDefinition};

const SCENARIOS: Namespace<ScenarioDefinition> = Namespace::new(BUCKET_SCENARIOS, "scenario");

/// Handle to a metadata database.
///
/// Cheap to share by reference across threads; all operations take
/// `&self`.
#[derive(Debug)]
pub struct MetadataDb {
    store: Store,
}

impl MetadataDb {
    /// Opens (or creates) a metadata database at `path`.
    pub fn open(path: impl AsRef<Path>) -> MetadataResult<Self> {
        Ok(Self {
            store: Store::open(path.as_ref())?,
        })
    }

    /// Opens a metadata database with explicit store settings.
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> MetadataResult<Self> {
        Ok(Self {
            store: Store::open_with_config(path.as_ref(), config)?,
        })
    }

    /// Opens a throwaway in-memory database, mostly for tests.
    pub fn open_in_memory() -> MetadataResult<Self> {
        Ok(Self {
            store: Store::open_in_memory()?,
        })
    }

    /// Creates a scenario and returns it as persisted.
    pub fn create_scenario(
        &self,
        id: &str,
        definition: &ScenarioDefinition,
    ) -> MetadataResult<Scenario> {
        SCENARIOS.create(&self.store, id, definition)
    }

    /// Fetches one scenario by identifier.
    pub fn get_scenario(&self, id: &str) -> MetadataResult<Scenario> {
        SCENARIOS.get(&self.store, id)
    }

    /// Lists all scenarios, ordered by identifier.
    pub fn list_scenarios(&self) -> MetadataResult<Vec<Scenario>> {
        SCENARIOS.list(&self.store)
    }

    /// Rewrites an existing scenario's definition.
    pub fn update_scenario(&self, scenario: &Scenario) -> MetadataResult<Scenario> {
        SCENARIOS.update(&self.store, scenario)
    }

    /// Deletes one scenario by identifier.
    pub fn delete_scenario(&self, id: &str) -> MetadataResult<()> {
        SCENARIOS.delete(&self.store, id)
    }

    /// Folds the commit log into the snapshot file.
    pub fn compact(&self) -> MetadataResult<()> {
        self.store.compact()?;
        Ok(())
    }

    /// Flushes state and releases the directory lock.
    pub fn close(&self) -> MetadataResult<()> {
        self.store.close()?;
        Ok(())
    }

    /// The underlying bucket store.
    pub fn store(&self) -> &Store {
        &self.store
    }
}
