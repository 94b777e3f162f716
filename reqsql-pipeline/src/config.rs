//! Pipeline configuration
//!
//! Selects the backend adapter for each stage and carries the connection
//! settings those adapters need. Everything comes from environment variables
//! with defaults matching the reference Snowflake deployment.

use anyhow::Context;
use reqsql_client::SnowflakeSettings;
use reqsql_client::anthropic;
use std::str::FromStr;
use std::time::Duration;

use crate::service::ResponseCleaning;

/// Language model adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Cortex,
    Anthropic,
}

impl ModelProvider {
    /// Cleaning rules that fit this adapter's reply style
    pub fn cleaning(self) -> ResponseCleaning {
        match self {
            ModelProvider::Cortex => ResponseCleaning::Strict,
            ModelProvider::Anthropic => ResponseCleaning::Lenient,
        }
    }
}

impl FromStr for ModelProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cortex" => Ok(ModelProvider::Cortex),
            "anthropic" | "claude" => Ok(ModelProvider::Anthropic),
            other => anyhow::bail!("unknown model provider '{}' (expected cortex or anthropic)", other),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Cortex => write!(f, "cortex"),
            ModelProvider::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Query execution backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseKind {
    Snowflake,
    Postgres,
}

impl WarehouseKind {
    /// SQL dialect named in query-generation prompts
    pub fn dialect(self) -> &'static str {
        match self {
            WarehouseKind::Snowflake => "Snowflake",
            WarehouseKind::Postgres => "PostgreSQL",
        }
    }
}

impl FromStr for WarehouseKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snowflake" => Ok(WarehouseKind::Snowflake),
            "postgres" | "postgresql" => Ok(WarehouseKind::Postgres),
            other => anyhow::bail!("unknown warehouse '{}' (expected snowflake or postgres)", other),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Snowflake connection, used by Cortex and the Snowflake warehouse
    pub snowflake: SnowflakeSettings,

    /// API key for the Anthropic adapter
    pub anthropic_api_key: Option<String>,

    /// Model adapter and model name for stage 1
    pub deriver: ModelProvider,
    pub deriver_model: String,

    /// Model adapter and model name for stage 2
    pub synthesizer: ModelProvider,
    pub synthesizer_model: String,

    /// Where stage 3 runs queries
    pub warehouse: WarehouseKind,

    /// PostgreSQL URL for the sandbox warehouse
    pub database_url: Option<String>,

    /// Timeout applied to HTTP backend clients
    pub request_timeout: Duration,

    /// Address the server listens on
    pub bind_addr: String,
}

/// Default model for each stage and provider
pub fn default_model(provider: ModelProvider, stage: u8) -> &'static str {
    match (provider, stage) {
        (ModelProvider::Cortex, 1) => "mistral-large2",
        (ModelProvider::Cortex, _) => "snowflake-arctic",
        (ModelProvider::Anthropic, _) => anthropic::DEFAULT_MODEL,
    }
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional here, `validate` decides
    /// which ones the selected adapters need):
    /// - SNOWFLAKE_ACCOUNT, SNOWFLAKE_USER, SNOWFLAKE_TOKEN
    /// - SNOWFLAKE_TOKEN_TYPE (default: PROGRAMMATIC_ACCESS_TOKEN)
    /// - SNOWFLAKE_ROLE, SNOWFLAKE_WAREHOUSE, SNOWFLAKE_DATABASE, SNOWFLAKE_SCHEMA
    /// - ANTHROPIC_API_KEY
    /// - REQSQL_DERIVER / REQSQL_SYNTHESIZER (cortex | anthropic, default: cortex)
    /// - REQSQL_DERIVER_MODEL / REQSQL_SYNTHESIZER_MODEL
    /// - REQSQL_WAREHOUSE (snowflake | postgres, default: snowflake)
    /// - DATABASE_URL
    /// - REQSQL_REQUEST_TIMEOUT (seconds, default: 120)
    /// - REQSQL_BIND_ADDR (default: 0.0.0.0:8080)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = SnowflakeSettings::default();

        let snowflake = SnowflakeSettings {
            account: var("SNOWFLAKE_ACCOUNT").unwrap_or_default(),
            user: var("SNOWFLAKE_USER").unwrap_or_default(),
            token: var("SNOWFLAKE_TOKEN").unwrap_or_default(),
            token_type: var("SNOWFLAKE_TOKEN_TYPE").unwrap_or(defaults.token_type),
            role: var("SNOWFLAKE_ROLE").unwrap_or(defaults.role),
            warehouse: var("SNOWFLAKE_WAREHOUSE").unwrap_or(defaults.warehouse),
            database: var("SNOWFLAKE_DATABASE").unwrap_or(defaults.database),
            schema: var("SNOWFLAKE_SCHEMA").unwrap_or(defaults.schema),
        };

        let deriver = match var("REQSQL_DERIVER") {
            Some(value) => value.parse::<ModelProvider>().context("Invalid REQSQL_DERIVER")?,
            None => ModelProvider::Cortex,
        };
        let synthesizer = match var("REQSQL_SYNTHESIZER") {
            Some(value) => value.parse::<ModelProvider>().context("Invalid REQSQL_SYNTHESIZER")?,
            None => ModelProvider::Cortex,
        };
        let warehouse = match var("REQSQL_WAREHOUSE") {
            Some(value) => value.parse::<WarehouseKind>().context("Invalid REQSQL_WAREHOUSE")?,
            None => WarehouseKind::Snowflake,
        };

        let request_timeout = match var("REQSQL_REQUEST_TIMEOUT") {
            Some(value) => Duration::from_secs(
                value
                    .trim()
                    .parse::<u64>()
                    .context("REQSQL_REQUEST_TIMEOUT must be a number of seconds")?,
            ),
            None => Duration::from_secs(120),
        };

        Ok(Self {
            snowflake,
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            deriver,
            deriver_model: var("REQSQL_DERIVER_MODEL")
                .unwrap_or_else(|| default_model(deriver, 1).to_string()),
            synthesizer,
            synthesizer_model: var("REQSQL_SYNTHESIZER_MODEL")
                .unwrap_or_else(|| default_model(synthesizer, 2).to_string()),
            warehouse,
            database_url: var("DATABASE_URL"),
            request_timeout,
            bind_addr: var("REQSQL_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }

    /// Whether any selected adapter talks to Snowflake
    pub fn uses_snowflake(&self) -> bool {
        self.deriver == ModelProvider::Cortex
            || self.synthesizer == ModelProvider::Cortex
            || self.warehouse == WarehouseKind::Snowflake
    }

    /// Whether any selected adapter talks to Anthropic
    pub fn uses_anthropic(&self) -> bool {
        self.deriver == ModelProvider::Anthropic || self.synthesizer == ModelProvider::Anthropic
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.uses_snowflake() {
            if self.snowflake.account.is_empty() {
                anyhow::bail!("SNOWFLAKE_ACCOUNT must be set for the selected backends");
            }
            if self.snowflake.token.is_empty() {
                anyhow::bail!("SNOWFLAKE_TOKEN must be set for the selected backends");
            }
        }

        if self.uses_anthropic() && self.anthropic_api_key.is_none() {
            anyhow::bail!("ANTHROPIC_API_KEY must be set to use the anthropic provider");
        }

        if self.warehouse == WarehouseKind::Postgres && self.database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set to use the postgres warehouse");
        }

        if self.deriver_model.trim().is_empty() || self.synthesizer_model.trim().is_empty() {
            anyhow::bail!("model names cannot be empty");
        }

        if self.request_timeout.as_secs() == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snowflake: SnowflakeSettings::default(),
            anthropic_api_key: None,
            deriver: ModelProvider::Cortex,
            deriver_model: default_model(ModelProvider::Cortex, 1).to_string(),
            synthesizer: ModelProvider::Cortex,
            synthesizer_model: default_model(ModelProvider::Cortex, 2).to_string(),
            warehouse: WarehouseKind::Snowflake,
            database_url: None,
            request_timeout: Duration::from_secs(120),
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.deriver, ModelProvider::Cortex);
        assert_eq!(config.deriver_model, "mistral-large2");
        assert_eq!(config.synthesizer_model, "snowflake-arctic");
        assert_eq!(config.warehouse, WarehouseKind::Snowflake);
        assert_eq!(config.snowflake.role, "sysadmin");
        assert_eq!(config.snowflake.warehouse, "admin_wh_xsmall");
        assert_eq!(config.snowflake.database, "streamlit_apps");
        assert_eq!(config.snowflake.schema, "llm_apps_sch");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");

        // Snowflake credentials are missing
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_snowflake_config_validates() {
        let config = Config::from_lookup(lookup(&[
            ("SNOWFLAKE_ACCOUNT", "xy12345"),
            ("SNOWFLAKE_TOKEN", "pat"),
            ("SNOWFLAKE_ROLE", "analyst"),
        ]))
        .unwrap();
        assert_eq!(config.snowflake.role, "analyst");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_anthropic_with_postgres() {
        let config = Config::from_lookup(lookup(&[
            ("REQSQL_DERIVER", "anthropic"),
            ("REQSQL_SYNTHESIZER", "Anthropic"),
            ("REQSQL_WAREHOUSE", "postgres"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("DATABASE_URL", "postgres://localhost/reqsql"),
        ]))
        .unwrap();
        assert_eq!(config.deriver_model, "claude-opus-4-20250514");
        assert_eq!(config.synthesizer.cleaning(), ResponseCleaning::Lenient);
        assert!(!config.uses_snowflake());
        assert!(config.validate().is_ok());

        let mut missing_url = config.clone();
        missing_url.database_url = None;
        assert!(missing_url.validate().is_err());

        let mut missing_key = config;
        missing_key.anthropic_api_key = None;
        assert!(missing_key.validate().is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup(&[("REQSQL_DERIVER", "gpt")])).is_err());
        assert!(Config::from_lookup(lookup(&[("REQSQL_WAREHOUSE", "oracle")])).is_err());
        assert!(Config::from_lookup(lookup(&[("REQSQL_REQUEST_TIMEOUT", "soon")])).is_err());
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let mut config = Config::default();
        config.snowflake.account = "xy12345".to_string();
        config.snowflake.token = "pat".to_string();
        assert!(config.validate().is_ok());

        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
