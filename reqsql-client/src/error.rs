//! Error types for the reqsql backends

use thiserror::Error;

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to a backend
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The database rejected the statement (syntax, unknown object, ...)
    #[error("{message}")]
    SqlError {
        /// Backend error code (Snowflake error code or SQLSTATE)
        code: Option<String>,
        /// SQLSTATE when the backend reports one separately
        sql_state: Option<String>,
        /// Message from the backend
        message: String,
    },

    /// Database connection or driver failure
    #[error("Database error: {0}")]
    Database(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Backend settings are unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn sql_error(code: Option<String>, message: impl Into<String>) -> Self {
        Self::SqlError {
            code,
            sql_state: None,
            message: message.into(),
        }
    }

    /// Check if this is a structured query error reported by the database
    pub fn is_sql_error(&self) -> bool {
        matches!(self, Self::SqlError { .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

impl From<sqlx::Error> for ClientError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.into_owned());
                Self::SqlError {
                    sql_state: code.clone(),
                    code,
                    message: db_err.message().to_string(),
                }
            }
            other => Self::Database(other.to_string()),
        }
    }
}
