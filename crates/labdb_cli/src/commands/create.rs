//! Create command implementation.

use std::path::Path;

use labdb_metadata::MetadataDb;

use super::{print_scenario, read_definition, CliResult};

/// Runs the create command.
pub fn run(path: &Path, id: &str, file: &str, format: &str) -> CliResult {
    let definition = read_definition(file)?;
    let db = MetadataDb::open(path)?;
    let scenario = db.create_scenario(id, &definition)?;
    db.close()?;
    print_scenario(&scenario, format)
}
