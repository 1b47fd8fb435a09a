//! Notification system for monitor findings
//!
//! Turns monitor lifecycle changes and [`MonitorEvent`]s into notifications
//! and delivers them through one or more channels.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │      NotificationManager                   │
//! │  - Fan-out to every channel                │
//! │  - Delivery failures logged, never fatal   │
//! └────────────────────────────────────────────┘
//!                     │
//!             ┌───────┴───────┐
//!             ▼               ▼
//!       ┌─────────┐     ┌─────────┐
//!       │ Discord │     │ Console │
//!       │ Channel │     │ Channel │
//!       └─────────┘     └─────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tablewatch::notifications::{
//!     DiscordChannel, DiscordConfig, Notification, NotificationManager,
//! };
//!
//! let mut manager = NotificationManager::new();
//! let discord = DiscordConfig::new("https://discord.com/api/webhooks/...").with_max_retries(5);
//! manager.add_channel(Box::new(DiscordChannel::new(discord)?));
//!
//! manager.notify(&Notification::started(&context)).await;
//! ```

pub mod channels;
mod manager;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::RestaurantSummary;
use crate::monitor::{MonitorEvent, WatchTarget};

// Re-exports
pub use channels::console::ConsoleChannel;
pub use channels::discord::{DiscordChannel, DiscordConfig};
pub use channels::Channel;
pub use manager::NotificationManager;

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Monitoring began
    MonitoringStarted,
    /// The preferred time is bookable
    SlotFound,
    /// Other times became bookable
    AlternativeTimes,
    /// Monitoring ended (found, cancelled or failed)
    MonitoringStopped,
    /// Monitoring failed
    Error,
}

impl NotificationKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MonitoringStarted => "monitoring_started",
            Self::SlotFound => "slot_found",
            Self::AlternativeTimes => "alternative_times",
            Self::MonitoringStopped => "monitoring_stopped",
            Self::Error => "error",
        }
    }

    /// Short headline
    pub fn headline(&self) -> &'static str {
        match self {
            Self::MonitoringStarted => "Monitoring Started",
            Self::SlotFound => "Reservation Available!",
            Self::AlternativeTimes => "Alternative Times Available!",
            Self::MonitoringStopped => "Monitoring Stopped",
            Self::Error => "Monitor Error",
        }
    }

    /// Get emoji representation
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::MonitoringStarted => "🔍",
            Self::SlotFound => "🎉",
            Self::AlternativeTimes => "⏰",
            Self::MonitoringStopped => "⏹️",
            Self::Error => "❌",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Restaurant and search parameters shared by every notification of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchContext {
    pub restaurant: RestaurantSummary,
    pub target: WatchTarget,
}

impl WatchContext {
    pub fn new(restaurant: RestaurantSummary, target: WatchTarget) -> Self {
        Self { restaurant, target }
    }
}

/// A rendered-agnostic notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub context: WatchContext,
    /// Time of the found slot (`HH:MM`)
    pub slot_time: Option<String>,
    /// Booking link, for found slots and alternatives
    pub reservation_link: Option<String>,
    /// One line per alternative slot
    pub alternatives: Vec<String>,
    /// Stop reason or error message
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn new(kind: NotificationKind, context: &WatchContext) -> Self {
        Self {
            kind,
            context: context.clone(),
            slot_time: None,
            reservation_link: None,
            alternatives: Vec::new(),
            message: None,
            created_at: Utc::now(),
        }
    }

    pub fn started(context: &WatchContext) -> Self {
        Self::new(NotificationKind::MonitoringStarted, context)
    }

    pub fn stopped(context: &WatchContext, reason: impl Into<String>) -> Self {
        let mut n = Self::new(NotificationKind::MonitoringStopped, context);
        n.message = Some(reason.into());
        n
    }

    pub fn error(context: &WatchContext, error: impl Into<String>) -> Self {
        let mut n = Self::new(NotificationKind::Error, context);
        n.message = Some(error.into());
        n
    }

    /// Notification for a monitor finding
    pub fn from_event(context: &WatchContext, event: &MonitorEvent) -> Self {
        match event {
            MonitorEvent::ExactMatch {
                slot,
                reservation_link,
            } => {
                let mut n = Self::new(NotificationKind::SlotFound, context);
                n.slot_time = Some(slot.time_label());
                n.reservation_link = Some(reservation_link.clone());
                n
            }
            MonitorEvent::Alternatives {
                reservation_link, ..
            } => {
                let mut n = Self::new(NotificationKind::AlternativeTimes, context);
                n.reservation_link = Some(reservation_link.clone());
                n.alternatives = event.descriptions();
                n
            }
        }
    }

    /// Plain-text rendering for terminals and logs
    pub fn format_message(&self) -> String {
        let restaurant = &self.context.restaurant;
        let target = &self.context.target;

        let mut lines = vec![
            format!("{} {}", self.kind.emoji(), self.kind.headline()),
            format!("   Restaurant : {}", restaurant.name),
            format!("   Date       : {}", target.date),
            format!("   Party size : {}", target.party_size),
        ];

        match self.kind {
            NotificationKind::MonitoringStarted => {
                lines.push(format!(
                    "   Preferred  : {}",
                    target.preferred_time_label()
                ));
            }
            NotificationKind::SlotFound => {
                if let Some(time) = &self.slot_time {
                    lines.push(format!("   Time       : {time}"));
                }
            }
            NotificationKind::AlternativeTimes => {
                lines.extend(self.alternatives.iter().map(|l| format!("   {l}")));
            }
            NotificationKind::MonitoringStopped | NotificationKind::Error => {}
        }

        if let Some(link) = &self.reservation_link {
            lines.push(format!("   Book now   : {link}"));
        }
        if let Some(message) = &self.message {
            lines.push(format!("   Reason     : {message}"));
        }

        lines.join("\n")
    }
}
