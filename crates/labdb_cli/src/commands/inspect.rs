//! Inspect command implementation.

use std::path::Path;

use serde::Serialize;

use super::{open_existing, CliResult};

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Database path.
    pub path: String,
    /// Snapshot file size in bytes.
    pub snapshot_size: u64,
    /// Commit log size in bytes.
    pub log_size: u64,
    /// Total size in bytes.
    pub total_size: u64,
    /// Number of scenario records.
    pub scenario_count: usize,
    /// Scenario identifiers, in order.
    pub scenario_ids: Vec<String>,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> CliResult {
    let db = open_existing(path)?;
    let scenarios = db.list_scenarios()?;
    let snapshot_size = db.store().snapshot_size()?;
    let log_size = db.store().log_size()?;
    let result = InspectResult {
        path: path.display().to_string(),
        snapshot_size,
        log_size,
        total_size: snapshot_size + log_size,
        scenario_count: scenarios.len(),
        scenario_ids: scenarios.into_iter().map(|s| s.id).collect(),
    };
    db.close()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            println!("labdb Database Inspection");
            println!("=========================");
            println!();
            println!("Path: {}", result.path);
            println!();
            println!("Storage:");
            println!("  Snapshot:    {} bytes", result.snapshot_size);
            println!("  Commit log:  {} bytes", result.log_size);
            println!("  Total:       {} bytes", result.total_size);
            println!();
            println!("Scenarios: {}", result.scenario_count);
            for id in &result.scenario_ids {
                println!("  {id}");
            }
        }
    }
    Ok(())
}
