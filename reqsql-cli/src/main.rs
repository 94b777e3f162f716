//! reqsql CLI
//!
//! Runs requirements documents through the test-query pipeline, either
//! in-process or on a reqsql server.

mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "reqsql")]
#[command(about = "Requirements to SQL test queries", long_about = None)]
struct Cli {
    /// reqsql server URL; without it the pipeline runs in-process
    #[arg(long, global = true, env = "REQSQL_SERVER_URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pipeline warnings go to stderr, stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server,
    };

    handle_command(cli.command, &config).await
}
