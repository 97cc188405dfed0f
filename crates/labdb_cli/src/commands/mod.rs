//! CLI command implementations.

pub mod compact;
pub mod create;
pub mod delete;
pub mod get;
pub mod inspect;
pub mod list;
pub mod update;

use std::io::Read;
use std::path::Path;

use labdb_metadata::{MetadataDb, Scenario, ScenarioDefinition};
use labdb_store::Config;
use tracing::debug;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Opens an existing database, refusing to create one.
fn open_existing(path: &Path) -> Result<MetadataDb, Box<dyn std::error::Error>> {
    debug!(path = %path.display(), "opening database");
    let config = Config::default().create_if_missing(false);
    Ok(MetadataDb::open_with_config(path, config)?)
}

/// Reads a scenario definition from a JSON file, or stdin for `-`.
fn read_definition(file: &str) -> Result<ScenarioDefinition, Box<dyn std::error::Error>> {
    let raw = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    Ok(serde_json::from_str(&raw)?)
}

/// Prints one scenario in the requested format.
fn print_scenario(scenario: &Scenario, format: &str) -> CliResult {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(scenario)?),
        _ => {
            println!("Scenario: {}", scenario.id);
            println!("  Created: {}", scenario.created_at.to_rfc3339());
            println!("  Updated: {}", scenario.updated_at.to_rfc3339());
            if !scenario.document.objects.is_empty() {
                println!("  Objects:");
                for (name, object) in &scenario.document.objects {
                    println!(
                        "    {} ({}) {}",
                        name, object.object_type, object.reference
                    );
                }
            }
            if !scenario.document.seed.is_empty() {
                println!("  Seed:");
                for (name, query) in &scenario.document.seed {
                    println!("    {name} -> {query}");
                }
            }
            if !scenario.document.benchmark.is_empty() {
                println!("  Benchmark:");
                for (name, query) in &scenario.document.benchmark {
                    println!("    {name} -> {query}");
                }
            }
        }
    }
    Ok(())
}
