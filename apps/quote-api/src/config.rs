//! Quote API configuration.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults                 ApiConfig::default()                       │
//! │  2. Config file              $PRINTWISE_CONFIG or ./printwise.toml      │
//! │  3. Environment variables    PRINTWISE_HTTP_PORT, ...                   │
//! │  4. validate()               rejects out-of-range values                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Config File
//! ```toml
//! http_port = 8080
//! bind_address = "0.0.0.0"
//! database_path = "/var/lib/printwise/printwise.db"
//! app_url = "https://quotes.example.com"
//! waste_threshold = 5
//! token_ttl_days = 90
//! log_format = "json"
//! ```

use printwise_core::token::MAX_TOKEN_TTL_DAYS;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const CONFIG_PATH_ENV: &str = "PRINTWISE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "printwise.toml";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log shipping.
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Quote API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Address to bind the HTTP server to
    pub bind_address: String,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub max_connections: u32,

    /// Public base URL share links are built from
    pub app_url: String,

    /// Waste percentage above which a justification is required
    pub waste_threshold: Decimal,

    /// Share link lifetime; unset means links never expire
    pub token_ttl_days: Option<u32>,

    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 8080,
            bind_address: "0.0.0.0".to_string(),
            database_path: PathBuf::from("./printwise.db"),
            max_connections: 5,
            app_url: "http://localhost:8080".to_string(),
            waste_threshold: Decimal::from(printwise_core::DEFAULT_WASTE_THRESHOLD_PERCENT),
            token_ttl_days: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Reads a TOML file, falling back to defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parses TOML; missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `PRINTWISE_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PRINTWISE_HTTP_PORT") {
            self.http_port = parse_env("PRINTWISE_HTTP_PORT", &port)?;
        }

        if let Some(address) = lookup("PRINTWISE_BIND_ADDRESS") {
            self.bind_address = address;
        }

        if let Some(path) = lookup("PRINTWISE_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }

        if let Some(max) = lookup("PRINTWISE_MAX_CONNECTIONS") {
            self.max_connections = parse_env("PRINTWISE_MAX_CONNECTIONS", &max)?;
        }

        if let Some(url) = lookup("PRINTWISE_APP_URL") {
            self.app_url = url;
        }

        if let Some(threshold) = lookup("PRINTWISE_WASTE_THRESHOLD") {
            self.waste_threshold = parse_env("PRINTWISE_WASTE_THRESHOLD", &threshold)?;
        }

        if let Some(days) = lookup("PRINTWISE_TOKEN_TTL_DAYS") {
            self.token_ttl_days = Some(parse_env("PRINTWISE_TOKEN_TTL_DAYS", &days)?);
        }

        if let Some(format) = lookup("PRINTWISE_LOG_FORMAT") {
            self.log_format = parse_env("PRINTWISE_LOG_FORMAT", &format)?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_port == 0 {
            return Err(ConfigError::InvalidValue("http_port must be greater than 0".into()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.waste_threshold < Decimal::ZERO || self.waste_threshold > Decimal::ONE_HUNDRED {
            return Err(ConfigError::InvalidValue(format!(
                "waste_threshold must be within 0..=100, got {}",
                self.waste_threshold
            )));
        }

        if let Some(days) = self.token_ttl_days {
            if days == 0 || days > MAX_TOKEN_TTL_DAYS {
                return Err(ConfigError::InvalidValue(format!(
                    "token_ttl_days must be within 1..={MAX_TOKEN_TTL_DAYS}, got {days}"
                )));
            }
        }

        if !self.app_url.starts_with("http://") && !self.app_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(format!(
                "app_url must start with http:// or https://, got: {}",
                self.app_url
            )));
        }

        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("bind_address: {}", self.bind_address)))
    }

    /// Share link a client opens to view and decide on a quote.
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/quotes/view/{}", self.app_url.trim_end_matches('/'), token)
    }
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{key}: {raw}")))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        config.validate().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.waste_threshold, Decimal::from(5));
        assert_eq!(config.token_ttl_days, None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ApiConfig::from_toml(
            r#"
            app_url = "https://quotes.example.com"
            token_ttl_days = 30
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.app_url, "https://quotes.example.com");
        assert_eq!(config.token_ttl_days, Some(30));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ApiConfig::from_toml("http_port = 9000").unwrap();
        config
            .apply_env_overrides(env(&[
                ("PRINTWISE_HTTP_PORT", "9100"),
                ("PRINTWISE_WASTE_THRESHOLD", "7.5"),
                ("PRINTWISE_LOG_FORMAT", "JSON"),
            ]))
            .unwrap();

        assert_eq!(config.http_port, 9100);
        assert_eq!(config.waste_threshold, Decimal::new(75, 1));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_env_overrides(env(&[("PRINTWISE_HTTP_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("PRINTWISE_HTTP_PORT"));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = ApiConfig::default();
        config.waste_threshold = Decimal::from(101);
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.token_ttl_days = Some(0);
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.app_url = "quotes.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_token_ttl_bounds() {
        let mut config = ApiConfig::default();
        config.token_ttl_days = Some(MAX_TOKEN_TTL_DAYS);
        assert!(config.validate().is_ok());

        config.token_ttl_days = Some(MAX_TOKEN_TTL_DAYS + 1);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token_ttl_days"));

        let mut config = ApiConfig::default();
        config
            .apply_env_overrides(env(&[("PRINTWISE_TOKEN_TTL_DAYS", "4294967295")]))
            .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_share_url() {
        let mut config = ApiConfig::default();
        config.app_url = "https://quotes.example.com/".to_string();
        assert_eq!(
            config.share_url("abc123"),
            "https://quotes.example.com/quotes/view/abc123"
        );
    }
}
