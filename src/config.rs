use clap::Parser;
use regex::Regex;
use std::net::SocketAddr;
use std::sync::LazyLock;
use validator::Validate;

use crate::store::StoreSettings;

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9]{2,62}$").expect("table name pattern is valid"));

static ROUTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/[A-Za-z0-9_-]+)*/?$").expect("route prefix pattern is valid"));

#[derive(Debug, Clone, Parser, Validate)]
#[command(name = "text-analyzer", version, about = "Text statistics API with analysis history")]
pub struct Config {
    /// Server bind address
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:7071")]
    pub bind_addr: SocketAddr,

    /// Table storage connection string (`redis://...` or `memory://`)
    #[arg(long, env = "TABLE_STORAGE_CONNECTION_STRING")]
    pub connection_string: Option<String>,

    /// Table holding analysis records
    #[arg(long, env = "TABLE_NAME", default_value = "Analyses")]
    #[validate(regex(path = *TABLE_NAME, message = "must start with a letter and be 3-63 alphanumeric characters"))]
    pub table_name: String,

    /// Path prefix for every route, e.g. `/api`
    #[arg(long, env = "ROUTE_PREFIX", default_value = "")]
    #[validate(regex(path = *ROUTE_PREFIX, message = "must look like /segment/segment"))]
    pub route_prefix: String,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    #[validate(length(min = 1))]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7071)),
            connection_string: None,
            table_name: "Analyses".to_string(),
            route_prefix: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from command-line arguments and environment variables
    pub fn load() -> Result<Self, validator::ValidationErrors> {
        let config = Config::parse();
        config.validate()?;
        Ok(config)
    }

    /// Store settings, or `None` when no connection string is set.
    pub fn store_settings(&self) -> Option<StoreSettings> {
        let connection_string = self.connection_string.as_deref()?.trim();
        if connection_string.is_empty() {
            return None;
        }

        Some(StoreSettings {
            connection_string: connection_string.to_string(),
            table_name: self.table_name.clone(),
        })
    }

    /// Route prefix normalized for nesting, `None` when routes sit at the root.
    pub fn normalized_prefix(&self) -> Option<String> {
        let trimmed = self.route_prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_parse_from_args() {
        let config = Config::parse_from([
            "text-analyzer",
            "--bind-addr",
            "0.0.0.0:8080",
            "--connection-string",
            "memory://",
            "--route-prefix",
            "/api",
        ]);

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.normalized_prefix().as_deref(), Some("/api"));
        assert_eq!(
            config.store_settings().unwrap().connection_string,
            "memory://"
        );
    }

    #[test]
    fn test_invalid_table_name() {
        let config = Config {
            table_name: "1bad".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            table_name: "ab".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_route_prefix() {
        let config = Config {
            route_prefix: "api".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_connection_string_is_unconfigured() {
        let config = Config {
            connection_string: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.store_settings().is_none());
        assert!(Config::default().store_settings().is_none());
    }

    #[test]
    fn test_root_prefix() {
        let config = Config {
            route_prefix: "/".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.normalized_prefix().is_none());
    }
}
