//! Delete command implementation.

use std::path::Path;

use super::{open_existing, CliResult};

/// Runs the delete command.
pub fn run(path: &Path, id: &str) -> CliResult {
    let db = open_existing(path)?;
    db.delete_scenario(id)?;
    db.close()?;
    println!("Deleted scenario {id:?}");
    Ok(())
}
