//! Snowflake SQL API backend
//!
//! Runs statements through the Snowflake SQL API v2:
//! - `POST /api/v2/statements` submits a statement
//! - `GET /api/v2/statements/{handle}` polls a statement that is still running
//!
//! Results come back in the `jsonv2` format where every value is a string
//! (or null); the column metadata in `resultSetMetaData.rowType` decides how
//! each value is decoded into a [`Cell`].

use async_trait::async_trait;
use reqsql_core::domain::cell::Cell;
use reqsql_core::domain::result::RowSet;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::backend::QueryBackend;
use crate::error::{ClientError, Result};

/// Connection settings for a Snowflake account
///
/// The token is sent as a bearer credential; `token_type` tells Snowflake
/// how to interpret it (programmatic access token, OAuth, key-pair JWT).
#[derive(Debug, Clone)]
pub struct SnowflakeSettings {
    pub account: String,
    pub user: String,
    pub token: String,
    pub token_type: String,
    pub role: String,
    pub warehouse: String,
    pub database: String,
    pub schema: String,
}

impl Default for SnowflakeSettings {
    fn default() -> Self {
        Self {
            account: String::new(),
            user: String::new(),
            token: String::new(),
            token_type: "PROGRAMMATIC_ACCESS_TOKEN".to_string(),
            role: "sysadmin".to_string(),
            warehouse: "admin_wh_xsmall".to_string(),
            database: "streamlit_apps".to_string(),
            schema: "llm_apps_sch".to_string(),
        }
    }
}

/// Builds the API base URL from an account locator
///
/// A full URL is used as-is so the client can point at a proxy.
pub fn account_url(account: &str) -> String {
    let account = account.trim().trim_end_matches('/');
    if account.starts_with("http://") || account.starts_with("https://") {
        account.to_string()
    } else if account.ends_with(".snowflakecomputing.com") {
        format!("https://{}", account)
    } else {
        format!("https://{}.snowflakecomputing.com", account)
    }
}

/// Query backend backed by the Snowflake SQL API
#[derive(Debug, Clone)]
pub struct SnowflakeClient {
    base_url: String,
    settings: SnowflakeSettings,
    client: Client,
    statement_timeout: Duration,
    poll_interval: Duration,
}

impl SnowflakeClient {
    /// Create a new client with a default HTTP client
    pub fn new(settings: SnowflakeSettings) -> Result<Self> {
        Self::with_client(settings, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(settings: SnowflakeSettings, client: Client) -> Result<Self> {
        if settings.account.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "Snowflake account is not set".to_string(),
            ));
        }
        if settings.token.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "Snowflake token is not set".to_string(),
            ));
        }

        debug!(
            "Snowflake client for account {} (user '{}', role {}, warehouse {})",
            settings.account, settings.user, settings.role, settings.warehouse
        );

        Ok(Self {
            base_url: account_url(&settings.account),
            settings,
            client,
            statement_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(500),
        })
    }

    /// Server-side timeout sent with every statement
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Get the base URL of the account
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn statement_request<'a>(&'a self, sql: &'a str) -> StatementRequest<'a> {
        StatementRequest {
            statement: sql,
            timeout: self.statement_timeout.as_secs(),
            role: &self.settings.role,
            warehouse: &self.settings.warehouse,
            database: &self.settings.database,
            schema: &self.settings.schema,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.settings.token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                &self.settings.token_type,
            )
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<StatementOutcome> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_response(status, &body)
    }

    /// Submits a statement and waits until Snowflake reports a final state
    async fn run_statement(&self, sql: &str) -> Result<StatementResponse> {
        let url = format!("{}/api/v2/statements", self.base_url);
        let mut outcome = self
            .send(self.client.post(&url).json(&self.statement_request(sql)))
            .await?;

        loop {
            match outcome {
                StatementOutcome::Complete(response) => return Ok(response),
                StatementOutcome::Running(handle) => {
                    debug!("Statement {} still running, polling", handle);
                    tokio::time::sleep(self.poll_interval).await;
                    let url = format!("{}/api/v2/statements/{}", self.base_url, handle);
                    outcome = self.send(self.client.get(&url)).await?;
                }
            }
        }
    }
}

#[async_trait]
impl QueryBackend for SnowflakeClient {
    fn name(&self) -> &str {
        "snowflake"
    }

    async fn execute(&self, sql: &str, max_rows: usize) -> Result<RowSet> {
        let response = self.run_statement(sql).await?;
        Ok(response.into_row_set(max_rows))
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    role: &'a str,
    warehouse: &'a str,
    database: &'a str,
    schema: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    row_type: Vec<RowType>,
}

#[derive(Debug, Deserialize)]
struct RowType {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    scale: Option<i64>,
}

/// Error and in-progress bodies share this shape
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    sql_state: Option<String>,
    #[serde(default)]
    statement_handle: Option<String>,
}

#[derive(Debug)]
enum StatementOutcome {
    Complete(StatementResponse),
    Running(String),
}

/// Maps an HTTP status and body to a statement outcome
///
/// 200 carries the result set, 202 means the statement is still executing,
/// 422 is a statement the database rejected.
fn interpret_response(status: StatusCode, body: &str) -> Result<StatementOutcome> {
    match status {
        StatusCode::OK => serde_json::from_str(body)
            .map(StatementOutcome::Complete)
            .map_err(|e| ClientError::ParseError(format!("Invalid statement response: {}", e))),
        StatusCode::ACCEPTED => {
            let status_body: StatusBody = serde_json::from_str(body).map_err(|e| {
                ClientError::ParseError(format!("Invalid statement status: {}", e))
            })?;
            status_body
                .statement_handle
                .map(StatementOutcome::Running)
                .ok_or_else(|| {
                    ClientError::ParseError("Running statement has no handle".to_string())
                })
        }
        StatusCode::UNPROCESSABLE_ENTITY => {
            let status_body: StatusBody = serde_json::from_str(body).unwrap_or_default();
            Err(ClientError::SqlError {
                code: status_body.code,
                sql_state: status_body.sql_state,
                message: status_body
                    .message
                    .unwrap_or_else(|| "Statement failed".to_string()),
            })
        }
        other => {
            let message = serde_json::from_str::<StatusBody>(body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| body.to_string());
            Err(ClientError::api_error(other.as_u16(), message))
        }
    }
}

impl StatementResponse {
    fn into_row_set(self, max_rows: usize) -> RowSet {
        let row_type = self
            .result_set_meta_data
            .map(|meta| meta.row_type)
            .unwrap_or_default();

        let columns = row_type.iter().map(|c| c.name.clone()).collect();
        let rows = self
            .data
            .into_iter()
            .take(max_rows)
            .map(|raw_row| {
                raw_row
                    .into_iter()
                    .enumerate()
                    .map(|(idx, raw)| match row_type.get(idx) {
                        Some(column) => decode_cell(&column.kind, column.scale, raw),
                        None => raw.map(Cell::Text).unwrap_or(Cell::Null),
                    })
                    .collect()
            })
            .collect();

        RowSet { columns, rows }
    }
}

/// Decodes one `jsonv2` value according to its Snowflake column type
fn decode_cell(kind: &str, scale: Option<i64>, raw: Option<String>) -> Cell {
    let Some(raw) = raw else {
        return Cell::Null;
    };

    match kind.to_ascii_lowercase().as_str() {
        // Scaled decimals stay text to keep their exact digits
        "fixed" if scale.unwrap_or(0) == 0 => raw
            .parse::<i64>()
            .map(Cell::Integer)
            .unwrap_or(Cell::Text(raw)),
        "real" => raw.parse::<f64>().map(Cell::Float).unwrap_or(Cell::Text(raw)),
        "boolean" => match raw.as_str() {
            "true" | "1" => Cell::Bool(true),
            "false" | "0" => Cell::Bool(false),
            _ => Cell::Text(raw),
        },
        "variant" | "object" | "array" => serde_json::from_str::<serde_json::Value>(&raw)
            .map(Cell::from)
            .unwrap_or(Cell::Text(raw)),
        "date" => decode_date(&raw).map(Cell::Text).unwrap_or(Cell::Text(raw)),
        "timestamp_ntz" | "timestamp_ltz" | "timestamp_tz" => decode_timestamp(&raw)
            .map(Cell::Text)
            .unwrap_or(Cell::Text(raw)),
        _ => Cell::Text(raw),
    }
}

/// Dates arrive as days since the epoch
fn decode_date(raw: &str) -> Option<String> {
    let days = raw.parse::<i64>().ok()?;
    let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let date = epoch.checked_add_signed(chrono::TimeDelta::try_days(days)?)?;
    Some(date.to_string())
}

/// Timestamps arrive as `seconds.fraction`, TZ values with a trailing offset
fn decode_timestamp(raw: &str) -> Option<String> {
    let epoch_part = raw.split_whitespace().next()?;
    let (secs, fraction) = match epoch_part.split_once('.') {
        Some((secs, fraction)) => (secs, fraction),
        None => (epoch_part, "0"),
    };
    let secs = secs.parse::<i64>().ok()?;
    let digits: String = fraction.chars().take(9).collect();
    let nanos = format!("{:0<9}", digits).parse::<u32>().ok()?;
    let timestamp = chrono::DateTime::from_timestamp(secs, nanos)?;
    Some(timestamp.naive_utc().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SnowflakeSettings {
        SnowflakeSettings {
            account: "xy12345.us-east-1".to_string(),
            token: "secret".to_string(),
            ..SnowflakeSettings::default()
        }
    }

    #[test]
    fn test_account_url() {
        assert_eq!(
            account_url("xy12345.us-east-1"),
            "https://xy12345.us-east-1.snowflakecomputing.com"
        );
        assert_eq!(
            account_url("xy12345.snowflakecomputing.com/"),
            "https://xy12345.snowflakecomputing.com"
        );
        assert_eq!(account_url("http://localhost:9000"), "http://localhost:9000");
    }

    #[test]
    fn test_client_requires_account_and_token() {
        assert!(SnowflakeClient::new(settings()).is_ok());

        let missing_account = SnowflakeSettings {
            account: String::new(),
            ..settings()
        };
        assert!(matches!(
            SnowflakeClient::new(missing_account),
            Err(ClientError::InvalidConfig(_))
        ));

        let missing_token = SnowflakeSettings {
            token: " ".to_string(),
            ..settings()
        };
        assert!(SnowflakeClient::new(missing_token).is_err());
    }

    #[test]
    fn test_statement_request_carries_context() {
        let client = SnowflakeClient::new(settings()).unwrap();
        let body = serde_json::to_value(client.statement_request("SELECT 1")).unwrap();
        assert_eq!(body["statement"], "SELECT 1");
        assert_eq!(body["role"], "sysadmin");
        assert_eq!(body["warehouse"], "admin_wh_xsmall");
        assert_eq!(body["database"], "streamlit_apps");
        assert_eq!(body["schema"], "llm_apps_sch");
        assert_eq!(body["timeout"], 120);
    }

    #[test]
    fn test_complete_response_decodes_by_column_type() {
        let body = r#"{
            "resultSetMetaData": {
                "numRows": 2,
                "format": "jsonv2",
                "rowType": [
                    {"name": "CLAIMID", "type": "text"},
                    {"name": "CLAIM_COUNT", "type": "fixed", "scale": 0},
                    {"name": "TOTAL", "type": "fixed", "scale": 2},
                    {"name": "OPEN", "type": "boolean"},
                    {"name": "DETAILS", "type": "variant"}
                ]
            },
            "data": [
                ["C-1", "3", "1250.50", "true", "{\"tags\":[\"auto\"]}"],
                ["C-2", null, "0.00", "false", null]
            ],
            "code": "090001",
            "statementHandle": "abc"
        }"#;

        let StatementOutcome::Complete(response) = interpret_response(StatusCode::OK, body).unwrap()
        else {
            panic!("expected a complete statement");
        };
        let row_set = response.into_row_set(11);

        assert_eq!(row_set.columns, vec!["CLAIMID", "CLAIM_COUNT", "TOTAL", "OPEN", "DETAILS"]);
        assert_eq!(row_set.rows.len(), 2);
        assert_eq!(row_set.rows[0][0], Cell::text("C-1"));
        assert_eq!(row_set.rows[0][1], Cell::Integer(3));
        assert_eq!(row_set.rows[0][2], Cell::text("1250.50"));
        assert_eq!(row_set.rows[0][3], Cell::Bool(true));
        assert!(row_set.rows[0][4].is_compound());
        assert_eq!(row_set.rows[1][1], Cell::Null);
        assert_eq!(row_set.rows[1][4], Cell::Null);
    }

    #[test]
    fn test_row_limit_applied() {
        let data: Vec<String> = (0..15).map(|i| format!("[\"{}\"]", i)).collect();
        let body = format!(
            r#"{{"resultSetMetaData": {{"rowType": [{{"name": "N", "type": "fixed", "scale": 0}}]}}, "data": [{}]}}"#,
            data.join(",")
        );
        let StatementOutcome::Complete(response) = interpret_response(StatusCode::OK, &body).unwrap()
        else {
            panic!("expected a complete statement");
        };
        assert_eq!(response.into_row_set(11).rows.len(), 11);
    }

    #[test]
    fn test_running_statement_yields_handle() {
        let body = r#"{"code": "333334", "message": "Asynchronous execution in progress.", "statementHandle": "01b2-handle"}"#;
        match interpret_response(StatusCode::ACCEPTED, body).unwrap() {
            StatementOutcome::Running(handle) => assert_eq!(handle, "01b2-handle"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_rejected_statement_is_sql_error() {
        let body = r#"{
            "code": "002003",
            "message": "SQL compilation error:\nObject 'CLAIMZ' does not exist or not authorized.",
            "sqlState": "42S02",
            "statementHandle": "abc"
        }"#;
        let err = interpret_response(StatusCode::UNPROCESSABLE_ENTITY, body).unwrap_err();
        assert!(err.is_sql_error());
        match err {
            ClientError::SqlError { code, sql_state, message } => {
                assert_eq!(code.as_deref(), Some("002003"));
                assert_eq!(sql_state.as_deref(), Some("42S02"));
                assert!(message.contains("CLAIMZ"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_auth_failure_is_api_error() {
        let body = r#"{"code": "390303", "message": "Invalid OAuth access token."}"#;
        let err = interpret_response(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(!err.is_sql_error());
        assert!(err.is_client_error());
        assert!(err.to_string().contains("Invalid OAuth access token."));
    }

    #[test]
    fn test_date_and_timestamp_decoding() {
        assert_eq!(decode_cell("date", None, Some("19723".into())), Cell::text("2024-01-01"));
        assert_eq!(
            decode_cell("timestamp_ntz", Some(9), Some("1704067200.500000000".into())),
            Cell::text("2024-01-01 00:00:00.500")
        );
        assert_eq!(
            decode_cell("timestamp_tz", Some(9), Some("1704067200.000000000 1440".into())),
            Cell::text("2024-01-01 00:00:00")
        );
        assert_eq!(decode_cell("date", None, Some("not-a-day".into())), Cell::text("not-a-day"));
    }
}
