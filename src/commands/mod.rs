pub mod search;
pub mod watch;

use anyhow::{Context, Result};
use std::path::Path;

use tablewatch::config::Config;
use tablewatch::error::Error;

// Re-export command functions for convenience
pub use search::search;
pub use watch::{watch, WatchParams};

/// Load configuration from `path`, or from the environment when absent
///
/// A file without a Discord webhook still picks up `DISCORD_WEBHOOK_URL`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let _ = dotenvy::dotenv();
            let mut config = Config::from_file(path)?;
            if config.notifications.discord_webhook_url.is_none() {
                config.notifications.discord_webhook_url = std::env::var("DISCORD_WEBHOOK_URL")
                    .ok()
                    .filter(|v| !v.trim().is_empty());
            }
            config
        }
        None => Config::from_env().context("Failed to load configuration from environment")?,
    };

    config.opentable.base_url = config.opentable.base_url.trim_end_matches('/').to_string();
    config
        .validate()
        .map_err(|e| Error::config(format!("{e:#}")))?;
    Ok(config)
}
