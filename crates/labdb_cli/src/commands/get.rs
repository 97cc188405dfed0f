//! Get command implementation.

use std::path::Path;

use super::{open_existing, print_scenario, CliResult};

/// Runs the get command.
pub fn run(path: &Path, id: &str, format: &str) -> CliResult {
    let db = open_existing(path)?;
    let scenario = db.get_scenario(id)?;
    db.close()?;
    print_scenario(&scenario, format)
}
