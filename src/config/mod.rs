//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::fetch::ProxyClientConfig;
use crate::session::SessionConfig;

/// Environment variable overriding `proxy.base_url`.
pub const API_URL_ENV: &str = "MATCH_HISTORY_API_URL";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Backend proxy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Base URL of the proxy
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:5005".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("match-history/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ProxyConfig {
    pub fn to_client_config(&self) -> ProxyClientConfig {
        ProxyClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Search session tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Matches requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Minimum gap between accepted "load more" requests
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Delay before the single retry of a failed match
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,

    #[serde(default = "default_stats_window")]
    pub stats_window: usize,

    #[serde(default = "default_tagline")]
    pub default_tagline: String,
}

fn default_page_size() -> u32 {
    20
}

fn default_debounce_ms() -> u64 {
    3000
}

fn default_retry_delay() -> u64 {
    15
}

fn default_stats_window() -> usize {
    20
}

fn default_tagline() -> String {
    "NA1".to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            retry_delay_seconds: default_retry_delay(),
            stats_window: default_stats_window(),
            default_tagline: default_tagline(),
        }
    }
}

impl SessionSettings {
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            page_size: self.page_size,
            debounce: Duration::from_millis(self.debounce_ms),
            retry_delay: Duration::from_secs(self.retry_delay_seconds),
            stats_window: self.stats_window,
            default_tagline: self.default_tagline.to_uppercase(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            proxy: ProxyConfig::default(),
            session: SessionSettings::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise defaults; then apply env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.proxy.base_url = url.trim().to_string();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Url::parse(&self.proxy.base_url).is_err() {
            return Err(ConfigError::ValidationError(format!(
                "Proxy base URL is not a valid URL: {}",
                self.proxy.base_url
            )));
        }

        if self.proxy.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Proxy timeout must be greater than 0".to_string(),
            ));
        }

        if self.session.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "Page size must be greater than 0".to_string(),
            ));
        }

        if self.session.stats_window == 0 {
            return Err(ConfigError::ValidationError(
                "Stats window must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
