//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod run;
mod sandbox;
mod schema;

pub use sandbox::SandboxCommands;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline over a requirements document
    Run {
        /// Path to the requirements document (UTF-8 text)
        file: PathBuf,

        /// Print the raw pipeline result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the schema queries are generated against
    Schema {
        /// Print PostgreSQL DDL instead of the semantic model
        #[arg(long)]
        ddl: bool,
    },
    /// PostgreSQL sandbox warehouse
    Sandbox {
        #[command(subcommand)]
        command: SandboxCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run { file, json } => run::handle_run_command(&file, json, config).await,
        Commands::Schema { ddl } => schema::handle_schema_command(ddl, config).await,
        Commands::Sandbox { command } => sandbox::handle_sandbox_command(command).await,
    }
}
