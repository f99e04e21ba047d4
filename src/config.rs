//! Configuration management for careerscope.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Main configuration for the careerscope service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// API key and CORS configuration
    #[serde(default)]
    pub security: SecurityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            rate_limiting: RateLimitingConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the discrete fields below
    pub url: Option<String>,

    /// Database host
    #[serde(default = "default_db_host")]
    pub host: String,

    /// Database port
    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Database user
    #[serde(default = "default_db_user")]
    pub user: String,

    /// Database password
    #[serde(default)]
    pub password: String,

    /// Database name
    #[serde(default = "default_db_name")]
    pub dbname: String,

    /// SSL mode (disable, allow, prefer, require, verify-ca, verify-full)
    #[serde(default = "default_db_sslmode")]
    pub sslmode: String,

    /// Maximum pool connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            dbname: default_db_name(),
            sslmode: default_db_sslmode(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "careerscope".to_string()
}

fn default_db_sslmode() -> String {
    "disable".to_string()
}

fn default_max_connections() -> u32 {
    10
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Maximum requests allowed per window for one caller identity
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Proxy headers consulted for the caller identity, in priority order
    #[serde(default = "default_trusted_headers")]
    pub trusted_headers: Vec<String>,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            trusted_headers: default_trusted_headers(),
        }
    }
}

impl RateLimitingConfig {
    /// The configured window as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

fn default_max_requests() -> u64 {
    60
}

fn default_window_secs() -> u64 {
    60
}

fn default_trusted_headers() -> Vec<String> {
    crate::ratelimit::DEFAULT_TRUSTED_HEADERS
        .iter()
        .map(|h| h.to_string())
        .collect()
}

/// API key and CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Accepted API keys; an empty list disables the key check
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Origins allowed by the CORS policy
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:5174".to_string(),
    ]
}

impl AppConfig {
    /// Load configuration from an optional file plus environment overrides.
    ///
    /// Without an explicit path a `careerscope.*` file in the working
    /// directory is picked up when present. Environment variables use the
    /// `CAREERSCOPE__` prefix with `__` separating nesting levels, e.g.
    /// `CAREERSCOPE__SERVER__LISTEN_ADDR`. A plain `DATABASE_URL` variable
    /// additionally overrides `database.url`, matching the usual hosting
    /// convention.
    pub fn load(path: Option<&Path>) -> crate::error::Result<Self> {
        let mut builder = config::Config::builder();
        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name("careerscope").required(false)),
        };
        builder = builder.add_source(
            config::Environment::with_prefix("CAREERSCOPE")
                .prefix_separator("__")
                .separator("__"),
        );

        let mut config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| crate::error::CareerscopeError::Config(e.to_string()))?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                config.database.url = Some(url);
            }
        }

        Ok(config)
    }
}
