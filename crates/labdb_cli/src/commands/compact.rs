//! Compact command implementation.

use std::path::Path;

use super::{open_existing, CliResult};

/// Runs the compact command.
pub fn run(path: &Path) -> CliResult {
    let db = open_existing(path)?;
    let before = db.store().log_size()?;
    db.compact()?;
    let after = db.store().log_size()?;
    db.close()?;

    println!("Compacted database at {}", path.display());
    println!("  Commit log before: {before} bytes");
    println!("  Commit log after:  {after} bytes");
    Ok(())
}
