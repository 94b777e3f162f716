//! Schema command handler
//!
//! Prints the schema from the configured server when there is one, so the
//! output matches what that server generates SQL against.

use anyhow::Result;
use reqsql_core::dto::pipeline::SchemaInfo;

use super::run::remote_error;
use crate::config::Config;

pub async fn handle_schema_command(ddl: bool, config: &Config) -> Result<()> {
    let info = match config.server_url {
        Some(_) => {
            let client = config.remote_client()?;
            client
                .schema()
                .await
                .map_err(|e| remote_error(client.base_url(), e))?
        }
        None => SchemaInfo::current(),
    };

    println!("{}", select(&info, ddl));
    Ok(())
}

fn select(info: &SchemaInfo, ddl: bool) -> &str {
    if ddl { &info.ddl } else { &info.semantic_model }
}
