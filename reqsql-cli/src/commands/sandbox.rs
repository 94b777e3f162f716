//! Sandbox command handlers
//!
//! Prepares a PostgreSQL database that can stand in for the Snowflake
//! warehouse (`REQSQL_WAREHOUSE=postgres`).

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use reqsql_client::PostgresBackend;
use reqsql_core::schema;

/// Sandbox subcommands
#[derive(Subcommand)]
pub enum SandboxCommands {
    /// Create the insurance tables if they do not exist
    Bootstrap {
        /// PostgreSQL connection URL
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

pub async fn handle_sandbox_command(command: SandboxCommands) -> Result<()> {
    match command {
        SandboxCommands::Bootstrap { database_url } => bootstrap(&database_url).await,
    }
}

async fn bootstrap(database_url: &str) -> Result<()> {
    println!("{}", "Connecting to PostgreSQL...".dimmed());
    let backend = PostgresBackend::connect(database_url)
        .await
        .context("Failed to connect to the sandbox database")?;

    backend
        .bootstrap_schema()
        .await
        .context("Failed to create sandbox tables")?;

    println!(
        "{} {}",
        "✓".green(),
        format!("Sandbox ready with {} tables", schema::TABLES.len()).bold()
    );
    for table in schema::TABLES {
        println!("  {}", table.name.cyan());
    }

    Ok(())
}
