//! Application configuration management
//!
//! This module handles loading and validating configuration from environment variables.
//! All configuration is loaded at startup and validated before the application runs.

use std::env;
use std::sync::LazyLock;

use crate::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_PUBLIC_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_SESSION_EXPIRY_HOURS, DEFAULT_STATE_EXPIRY_MINUTES,
    DEFAULT_UPSTREAM_TIMEOUT_SECS, DEFAULT_USER_AGENT, DEFAULT_WAKATIME_BASE_URL,
    DEFAULT_WAKATIME_SCOPE,
};

/// Global application configuration (lazily initialized)
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().expect("Failed to load configuration from environment")
});

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub wakatime: WakaTimeConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Scheme and host used when the request does not say where it came from
    pub public_url: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session cookie and OAuth state signing
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub expiry_hours: i64,
    pub cookie_secure: bool,
    pub state_expiry_minutes: i64,
}

/// WakaTime OAuth application settings
#[derive(Debug, Clone)]
pub struct WakaTimeConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub base_url: String,
    pub scope: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            session: SessionConfig::from_env()?,
            wakatime: WakaTimeConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            public_url: env::var("PUBLIC_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string()),
        })
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: required_var("DATABASE_URL")?,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS)?,
        })
    }
}

impl SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: required_var("SESSION_SECRET")?,
            expiry_hours: parse_var("SESSION_EXPIRY_HOURS", DEFAULT_SESSION_EXPIRY_HOURS)?,
            cookie_secure: parse_var("COOKIE_SECURE", false)?,
            state_expiry_minutes: parse_var("STATE_EXPIRY_MINUTES", DEFAULT_STATE_EXPIRY_MINUTES)?,
        })
    }
}

impl WakaTimeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: required_var("WAKATIME_CLIENT_ID")?,
            client_secret: required_var("WAKATIME_SECRET")?,
            redirect_uri: required_var("WAKATIME_REDIRECT_URI")?,
            base_url: env::var("WAKATIME_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_WAKATIME_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            scope: env::var("WAKATIME_SCOPE").unwrap_or_else(|_| DEFAULT_WAKATIME_SCOPE.to_string()),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECS)?,
        })
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name.to_string()))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
