//! Notification fan-out

use super::channels::{
    console::ConsoleChannel, discord::DiscordChannel, Channel, ChannelError, DeliveryStatus,
};
use super::Notification;
use crate::config::NotificationConfig;
use crate::notifications::DiscordConfig;

/// Delivers every notification to all registered channels
#[derive(Default)]
pub struct NotificationManager {
    channels: Vec<Box<dyn Channel>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console output plus Discord when a webhook URL is configured
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::InvalidConfig` for an unusable webhook URL
    pub fn from_config(config: &NotificationConfig) -> Result<Self, ChannelError> {
        let mut manager = Self::new();
        manager.add_channel(Box::new(ConsoleChannel::new()));

        if let Some(url) = &config.discord_webhook_url {
            let discord = DiscordConfig::new(url.as_str())
                .with_timeout(config.webhook_timeout_secs)
                .with_max_retries(config.webhook_max_retries);
            let channel = DiscordChannel::new(discord)?;
            manager.add_channel(Box::new(channel));
        } else {
            tracing::warn!("No Discord webhook configured, notifications go to the console only");
        }

        Ok(manager)
    }

    pub fn add_channel(&mut self, channel: Box<dyn Channel>) {
        self.channels.push(channel);
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Send to every channel in registration order
    ///
    /// Failures are logged and reported in the returned statuses; one
    /// failing channel never prevents delivery to the others.
    pub async fn notify(&self, notification: &Notification) -> Vec<DeliveryStatus> {
        let mut statuses = Vec::with_capacity(self.channels.len());

        for channel in &self.channels {
            let status = match channel.send(notification).await {
                Ok(status) => status,
                Err(e) => DeliveryStatus::failure(channel.name(), e.to_string()),
            };

            if status.success {
                tracing::debug!(kind = %notification.kind, %status, "Notification delivered");
            } else {
                tracing::warn!(kind = %notification.kind, %status, "Notification not delivered");
            }
            statuses.push(status);
        }

        statuses
    }
}
