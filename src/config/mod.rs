//! Configuration management for tablewatch
//!
//! This module handles loading and validating configuration from environment variables
//! (optionally seeded from a `.env` file) and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Desktop Chrome user agent sent with every OpenTable request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenTable transport configuration
    #[serde(default)]
    pub opentable: OpenTableConfig,

    /// Poll loop configuration
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Notification channels
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenTable transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenTableConfig {
    /// Site root, also used as `origin` for API calls
    pub base_url: String,

    /// IP geolocation endpoint returning `{"latitude", "longitude"}`
    pub geo_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Region sent with availability queries
    pub database_region: String,

    /// User agent string
    pub user_agent: String,
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between polls
    pub poll_interval_secs: u64,
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Discord webhook URL; console only when unset
    pub discord_webhook_url: Option<String>,

    /// Webhook request timeout in seconds
    #[serde(default = "default_webhook_timeout")]
    pub webhook_timeout_secs: u64,

    /// Maximum webhook retry attempts
    #[serde(default = "default_webhook_retries")]
    pub webhook_max_retries: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

fn default_webhook_timeout() -> u64 {
    10
}

fn default_webhook_retries() -> u32 {
    3
}

impl Default for OpenTableConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://www.opentable.ca"),
            geo_url: String::from("https://ipapi.co/json"),
            request_timeout_secs: 30,
            database_region: String::from("NA"),
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            discord_webhook_url: None,
            webhook_timeout_secs: default_webhook_timeout(),
            webhook_max_retries: default_webhook_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let base_url = std::env::var("TABLEWATCH_BASE_URL")
            .unwrap_or(defaults.opentable.base_url)
            .trim_end_matches('/')
            .to_string();

        let geo_url = std::env::var("TABLEWATCH_GEO_URL").unwrap_or(defaults.opentable.geo_url);

        let request_timeout_secs = env_or(
            "TABLEWATCH_REQUEST_TIMEOUT",
            defaults.opentable.request_timeout_secs,
        );

        let database_region = std::env::var("TABLEWATCH_DATABASE_REGION")
            .unwrap_or(defaults.opentable.database_region);

        let user_agent =
            std::env::var("TABLEWATCH_USER_AGENT").unwrap_or(defaults.opentable.user_agent);

        let poll_interval_secs = env_or(
            "TABLEWATCH_POLL_INTERVAL",
            defaults.monitor.poll_interval_secs,
        );

        let discord_webhook_url = std::env::var("DISCORD_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let log_level =
            std::env::var("TABLEWATCH_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let log_format =
            std::env::var("TABLEWATCH_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            opentable: OpenTableConfig {
                base_url,
                geo_url,
                request_timeout_secs,
                database_region,
                user_agent,
            },
            monitor: MonitorConfig { poll_interval_secs },
            notifications: NotificationConfig {
                discord_webhook_url,
                webhook_timeout_secs: env_or(
                    "TABLEWATCH_WEBHOOK_TIMEOUT",
                    default_webhook_timeout(),
                ),
                webhook_max_retries: env_or(
                    "TABLEWATCH_WEBHOOK_RETRIES",
                    default_webhook_retries(),
                ),
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.opentable.base_url.starts_with("http://")
            && !self.opentable.base_url.starts_with("https://")
        {
            anyhow::bail!("base_url must start with http:// or https://");
        }

        if self.opentable.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.monitor.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be greater than 0");
        }

        if let Some(url) = &self.notifications.discord_webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("discord_webhook_url must start with http:// or https://");
            }
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.opentable.request_timeout_secs)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.poll_interval_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            opentable: OpenTableConfig::default(),
            monitor: MonitorConfig::default(),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
