//! Update command implementation.

use std::path::Path;

use super::{open_existing, print_scenario, read_definition, CliResult};

/// Runs the update command.
pub fn run(path: &Path, id: &str, file: &str, format: &str) -> CliResult {
    let definition = read_definition(file)?;
    let db = open_existing(path)?;
    let mut scenario = db.get_scenario(id)?;
    scenario.document = definition;
    let updated = db.update_scenario(&scenario)?;
    db.close()?;
    print_scenario(&updated, format)
}
