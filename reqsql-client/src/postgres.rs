//! PostgreSQL sandbox warehouse
//!
//! Lets the pipeline run end to end against a local database that carries
//! the P&C schema, without a Snowflake account.

use async_trait::async_trait;
use futures::TryStreamExt;
use reqsql_core::domain::cell::Cell;
use reqsql_core::domain::result::RowSet;
use reqsql_core::schema;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Executor, Row, Statement, TypeInfo, ValueRef};
use std::time::Duration;
use tracing::{debug, info};

use crate::backend::QueryBackend;
use crate::error::Result;

/// Query backend over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Connect to the database at `database_url`
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the P&C tables if they do not exist yet
    pub async fn bootstrap_schema(&self) -> Result<()> {
        for statement in schema::ddl_statements() {
            sqlx::query(&statement).execute(&self.pool).await?;
        }

        info!("Sandbox schema ready ({} tables)", schema::TABLES.len());
        Ok(())
    }
}

#[async_trait]
impl QueryBackend for PostgresBackend {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn execute(&self, sql: &str, max_rows: usize) -> Result<RowSet> {
        let mut conn = self.pool.acquire().await?;

        // Preparing first gives us column names even when no rows come back
        let statement = (&mut *conn).prepare(sql).await?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        // Stop pulling rows once the cap is reached
        let mut stream = statement.query().fetch(&mut *conn);
        let mut fetched = Vec::new();
        while fetched.len() < max_rows {
            match stream.try_next().await? {
                Some(row) => fetched.push(row),
                None => break,
            }
        }
        drop(stream);
        debug!("Postgres returned {} rows", fetched.len());

        let rows = fetched
            .iter()
            .map(|row| {
                (0..columns.len())
                    .map(|idx| decode_cell(row, idx))
                    .collect::<Result<Vec<Cell>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RowSet { columns, rows })
    }
}

fn get<'r, T>(row: &'r PgRow, idx: usize) -> Result<Option<T>>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    Ok(row.try_get::<Option<T>, _>(idx)?)
}

fn decode_cell(row: &PgRow, idx: usize) -> Result<Cell> {
    let value = row.try_get_raw(idx)?;
    if value.is_null() {
        return Ok(Cell::Null);
    }
    let type_name = value.type_info().name().to_string();

    let cell = match type_name.as_str() {
        "BOOL" => get::<bool>(row, idx)?.map(Cell::Bool),
        "INT2" => get::<i16>(row, idx)?.map(|v| Cell::Integer(v.into())),
        "INT4" => get::<i32>(row, idx)?.map(|v| Cell::Integer(v.into())),
        "INT8" => get::<i64>(row, idx)?.map(Cell::Integer),
        "FLOAT4" => get::<f32>(row, idx)?.map(|v| Cell::Float(v.into())),
        "FLOAT8" => get::<f64>(row, idx)?.map(Cell::Float),
        "NUMERIC" => get::<sqlx::types::BigDecimal>(row, idx)?.map(|v| Cell::Text(v.to_string())),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => get::<String>(row, idx)?.map(Cell::Text),
        "DATE" => get::<chrono::NaiveDate>(row, idx)?.map(|v| Cell::Text(v.to_string())),
        "TIMESTAMP" => get::<chrono::NaiveDateTime>(row, idx)?.map(|v| Cell::Text(v.to_string())),
        "TIMESTAMPTZ" => get::<chrono::DateTime<chrono::Utc>>(row, idx)?
            .map(|v| Cell::Text(v.to_rfc3339())),
        "UUID" => get::<uuid::Uuid>(row, idx)?.map(|v| Cell::Text(v.to_string())),
        "JSON" | "JSONB" => get::<serde_json::Value>(row, idx)?.map(Cell::from),
        "TEXT[]" | "VARCHAR[]" => get::<Vec<String>>(row, idx)?
            .map(|items| Cell::List(items.into_iter().map(Cell::Text).collect())),
        other => match row.try_get::<Option<String>, _>(idx) {
            Ok(value) => value.map(Cell::Text),
            Err(_) => Some(Cell::Text(format!("<{}>", other))),
        },
    };

    Ok(cell.unwrap_or(Cell::Null))
}
