//! List command implementation.

use std::path::Path;

use super::{open_existing, CliResult};

/// Runs the list command.
pub fn run(path: &Path, format: &str) -> CliResult {
    let db = open_existing(path)?;
    let scenarios = db.list_scenarios()?;
    db.close()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&scenarios)?),
        _ => {
            if scenarios.is_empty() {
                println!("No scenarios");
                return Ok(());
            }
            println!("{:<24} {:<8} {:<8} {}", "ID", "OBJECTS", "SEED", "UPDATED");
            for scenario in &scenarios {
                println!(
                    "{:<24} {:<8} {:<8} {}",
                    scenario.id,
                    scenario.document.objects.len(),
                    scenario.document.seed.len(),
                    scenario.updated_at.to_rfc3339()
                );
            }
        }
    }
    Ok(())
}
