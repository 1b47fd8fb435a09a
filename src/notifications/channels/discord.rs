//! Discord webhook channel
//!
//! Posts each notification as a single embed to a Discord incoming webhook.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Channel, ChannelError, ChannelResult, DeliveryStatus};
use crate::notifications::{Notification, NotificationKind};
use crate::utils::truncate_text;

/// Discord caps embed field values at 1024 characters
pub const FIELD_VALUE_LIMIT: usize = 1000;

const COLOR_GREEN: u32 = 0x00FF00;
const COLOR_ORANGE: u32 = 0xFFAA00;
const COLOR_BLURPLE: u32 = 0x5865F2;
const COLOR_RED: u32 = 0xFF0000;

/// Discord channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Incoming webhook URL
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// First backoff delay, doubled on every retry
    #[serde(default = "default_retry_delay")]
    pub retry_base_delay_ms: u64,
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1000
}

impl DiscordConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_base_delay_ms: default_retry_delay(),
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_base_delay_ms: u64) -> Self {
        self.retry_base_delay_ms = retry_base_delay_ms;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Discord webhook URL cannot be empty".to_string());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("Discord webhook URL must start with http:// or https://".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(1 << (attempt - 1).min(16)))
    }
}

/// Webhook body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscordWebhook {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscordEmbed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        // Discord rejects embeds with empty field values
        let value = if value.trim().is_empty() {
            "-".to_string()
        } else {
            value
        };
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }

    fn inline(name: &str, value: impl Into<String>) -> Self {
        Self::new(name, value.into(), true)
    }

    fn block(name: &str, value: impl Into<String>) -> Self {
        Self::new(name, value.into(), false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
}

/// Render a notification as a Discord webhook body
pub fn build_webhook(notification: &Notification) -> DiscordWebhook {
    let restaurant = &notification.context.restaurant;
    let target = &notification.context.target;
    let name = restaurant.name.as_str();

    let mut fields = vec![
        EmbedField::inline("🏪 Restaurant", name),
        EmbedField::inline("📍 Location", restaurant.location()),
    ];

    let (title, description, color, footer) = match notification.kind {
        NotificationKind::MonitoringStarted => {
            fields.push(EmbedField::inline("🌍 Country", restaurant.country.as_str()));
            fields.push(EmbedField::inline("📅 Date", target.date.to_string()));
            fields.push(EmbedField::inline(
                "⏰ Preferred Time",
                target.preferred_time_label(),
            ));
            fields.push(EmbedField::inline("👥 Party Size", target.party_size.to_string()));
            (
                "🎯 OpenTable Reservation Monitor Active",
                format!("Now monitoring **{name}** for available reservations!"),
                COLOR_BLURPLE,
                "OpenTable Monitor • You'll be notified when slots become available!",
            )
        }
        NotificationKind::SlotFound => {
            let time = notification
                .slot_time
                .clone()
                .unwrap_or_else(|| target.preferred_time_label());
            fields.push(EmbedField::inline("🌍 Country", restaurant.country.as_str()));
            fields.push(EmbedField::inline("📅 Date", target.date.to_string()));
            fields.push(EmbedField::inline("⏰ Time", time));
            fields.push(EmbedField::inline("👥 Party Size", target.party_size.to_string()));
            if let Some(link) = &notification.reservation_link {
                fields.push(EmbedField::block(
                    "🔗 Book Now",
                    format!("[Click here to reserve]({link})"),
                ));
            }
            (
                "✅ Exact Time Slot Found!",
                format!("Your preferred reservation slot is now available at **{name}**!"),
                COLOR_GREEN,
                "OpenTable Monitor • Book quickly before it's taken!",
            )
        }
        NotificationKind::AlternativeTimes => {
            fields.push(EmbedField::inline("🌍 Country", restaurant.country.as_str()));
            fields.push(EmbedField::inline("📅 Date", target.date.to_string()));
            fields.push(EmbedField::inline("👥 Party Size", target.party_size.to_string()));
            fields.push(EmbedField::block(
                "⏰ Available Times",
                truncate_text(&notification.alternatives.join("\n"), FIELD_VALUE_LIMIT),
            ));
            (
                "🔄 Alternative Reservation Times",
                format!(
                    "Your exact preferred time isn't available, but there are other options at **{name}**!"
                ),
                COLOR_ORANGE,
                "OpenTable Monitor • Consider booking one of these times!",
            )
        }
        NotificationKind::MonitoringStopped => {
            fields.push(EmbedField::block(
                "❓ Reason",
                notification.message.clone().unwrap_or_default(),
            ));
            (
                "🛑 OpenTable Monitor Stopped",
                format!("Monitoring for **{name}** has been stopped."),
                COLOR_RED,
                "OpenTable Monitor",
            )
        }
        NotificationKind::Error => {
            fields.push(EmbedField::block(
                "❌ Error",
                truncate_text(
                    notification.message.as_deref().unwrap_or_default(),
                    FIELD_VALUE_LIMIT,
                ),
            ));
            (
                "⚠️ OpenTable Monitor Error",
                format!("An error occurred while monitoring **{name}**."),
                COLOR_RED,
                "OpenTable Monitor • Please check the application",
            )
        }
    };

    let url = match notification.kind {
        NotificationKind::SlotFound => notification.reservation_link.clone(),
        _ => None,
    };

    DiscordWebhook {
        content: format!(
            "{} **{}**",
            notification.kind.emoji(),
            notification.kind.headline()
        ),
        embeds: vec![DiscordEmbed {
            title: title.to_string(),
            description,
            color,
            url,
            fields,
            footer: Some(EmbedFooter {
                text: footer.to_string(),
            }),
            timestamp: notification.created_at.to_rfc3339(),
        }],
    }
}

/// Discord notification channel
///
/// # Example
///
/// ```rust,ignore
/// use tablewatch::notifications::{DiscordChannel, DiscordConfig};
///
/// let config = DiscordConfig::new("https://discord.com/api/webhooks/1/abc")
///     .with_timeout(15)
///     .with_max_retries(5);
///
/// let channel = DiscordChannel::new(config)?;
/// channel.send(&notification).await?;
/// ```
pub struct DiscordChannel {
    config: DiscordConfig,
    client: Client,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig) -> ChannelResult<Self> {
        config.validate().map_err(ChannelError::InvalidConfig)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChannelError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    async fn post_once(&self, webhook: &DiscordWebhook) -> ChannelResult<()> {
        let response = self.client.post(&self.config.url).json(webhook).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ChannelError::RateLimited(body));
        }
        Err(ChannelError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    /// Post with exponential backoff; client errors other than 429 are final
    async fn send_with_retry(&self, webhook: &DiscordWebhook) -> ChannelResult<()> {
        let mut attempt = 0;
        loop {
            match self.post_once(webhook).await {
                Ok(()) => {
                    tracing::info!(attempt = attempt + 1, "Discord webhook delivered");
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.backoff(attempt);
                    tracing::debug!(
                        error = %e,
                        "Retrying Discord webhook (attempt {}/{}) in {:?}",
                        attempt + 1,
                        self.config.max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send(&self, notification: &Notification) -> ChannelResult<DeliveryStatus> {
        let webhook = build_webhook(notification);

        match self.send_with_retry(&webhook).await {
            Ok(()) => Ok(DeliveryStatus::success_with_message(
                "discord",
                format!("Delivered {}", notification.kind),
            )),
            Err(e) => {
                tracing::error!(
                    kind = %notification.kind,
                    error = %e,
                    "Failed to deliver Discord webhook"
                );
                Ok(DeliveryStatus::failure("discord", e.to_string()))
            }
        }
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name(),
            "timeout_secs": self.config.timeout_secs,
            "max_retries": self.config.max_retries,
        })
    }
}
