//! labdb CLI
//!
//! Command-line tools for scenario databases.
//!
//! # Commands
//!
//! - `create` - Create a scenario from a JSON definition
//! - `get` - Print one scenario
//! - `list` - List all scenarios
//! - `update` - Replace a scenario's definition
//! - `delete` - Delete a scenario
//! - `inspect` - Display database statistics
//! - `compact` - Fold the commit log into the snapshot

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// labdb command-line scenario database tools.
#[derive(Parser)]
#[command(name = "labdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a scenario from a JSON definition
    Create {
        /// Scenario identifier
        id: String,

        /// Definition JSON file, or '-' for stdin
        #[arg(short, long, default_value = "-")]
        file: String,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print one scenario
    Get {
        /// Scenario identifier
        id: String,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List all scenarios
    List {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Replace a scenario's definition
    Update {
        /// Scenario identifier
        id: String,

        /// Definition JSON file, or '-' for stdin
        #[arg(short, long, default_value = "-")]
        file: String,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a scenario
    Delete {
        /// Scenario identifier
        id: String,
    },

    /// Display database statistics
    Inspect {
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Fold the commit log into the snapshot
    Compact,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Create { id, file, format } => {
            let path = cli.path.ok_or("Database path required for create")?;
            commands::create::run(&path, &id, &file, &format)?;
        }
        Commands::Get { id, format } => {
            let path = cli.path.ok_or("Database path required for get")?;
            commands::get::run(&path, &id, &format)?;
        }
        Commands::List { format } => {
            let path = cli.path.ok_or("Database path required for list")?;
            commands::list::run(&path, &format)?;
        }
        Commands::Update { id, file, format } => {
            let path = cli.path.ok_or("Database path required for update")?;
            commands::update::run(&path, &id, &file, &format)?;
        }
        Commands::Delete { id } => {
            let path = cli.path.ok_or("Database path required for delete")?;
            commands::delete::run(&path, &id)?;
        }
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Database path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Compact => {
            let path = cli.path.ok_or("Database path required for compact")?;
            commands::compact::run(&path)?;
        }
        Commands::Version => {
            println!("labdb CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
