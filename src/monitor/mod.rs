//! Availability monitor
//!
//! Polls a reservation service for one restaurant/date/party, diffs each
//! snapshot against the previous one and reports what changed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  fetch   ┌───────────────────────┐
//! │   Monitor    │ ───────▶ │  AvailabilityFetcher  │
//! │  (poll loop) │ ◀─────── │  (OpenTable client)   │
//! └──────────────┘  slots   └───────────────────────┘
//!        │
//!        ▼ diff(previous, current)
//! ┌──────────────┐  MonitorEvent   ┌───────────────────┐
//! │  DiffOutcome │ ──────────────▶ │  event sink (FnMut)│
//! └──────────────┘                 └───────────────────┘
//! ```
//!
//! The loop runs until the preferred time shows up, a fetch fails, or the
//! cancellation token fires.

pub mod diff;
mod poll;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Slot;
use crate::utils::error::FetchError;

pub use diff::{diff, DiffOutcome};
pub use poll::{Monitor, DEFAULT_POLL_INTERVAL};

/// What to watch: restaurant, date, preferred time and party size
///
/// Values are validated by whoever builds the target; the monitor does not
/// re-check formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTarget {
    pub restaurant_id: String,
    pub date: NaiveDate,
    pub preferred_time: NaiveTime,
    pub party_size: u32,
}

impl WatchTarget {
    pub fn new(
        restaurant_id: impl Into<String>,
        date: NaiveDate,
        preferred_time: NaiveTime,
        party_size: u32,
    ) -> Self {
        Self {
            restaurant_id: restaurant_id.into(),
            date,
            preferred_time,
            party_size,
        }
    }

    /// Preferred time rendered as `HH:MM`
    pub fn preferred_time_label(&self) -> String {
        self.preferred_time.format("%H:%M").to_string()
    }
}

/// Result of one successful availability fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    /// Open slots with absolute times
    pub slots: Vec<Slot>,
    /// Opaque token required by reservation links
    pub token: String,
    /// Numeric restaurant id required by reservation links
    pub restaurant_id: i64,
}

impl Availability {
    /// The service reported no availability entries at all
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Source of availability snapshots
///
/// Implementations own their transport and must bound every call with a
/// timeout. Raw service time encodings are converted to absolute times
/// before slots are returned.
#[async_trait]
pub trait AvailabilityFetcher: Send + Sync {
    async fn fetch(&self, target: &WatchTarget) -> Result<Availability, FetchError>;
}

/// Kind of event emitted by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// The preferred time is bookable
    ExactMatch,
    /// New slots at other times appeared
    Alternatives,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::Alternatives => "alternatives",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A newly available slot together with its booking link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub slot: Slot,
    pub reservation_link: String,
}

/// Finding reported through the event sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonitorEvent {
    /// Preferred time found; always the last event of a run
    ExactMatch {
        slot: Slot,
        reservation_link: String,
    },
    /// Slots that were not present in the previous poll
    Alternatives {
        alternatives: Vec<Alternative>,
        /// Link of the first added slot
        reservation_link: String,
    },
}

impl MonitorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ExactMatch { .. } => EventKind::ExactMatch,
            Self::Alternatives { .. } => EventKind::Alternatives,
        }
    }

    pub fn reservation_link(&self) -> &str {
        match self {
            Self::ExactMatch {
                reservation_link, ..
            }
            | Self::Alternatives {
                reservation_link, ..
            } => reservation_link,
        }
    }

    /// One line per alternative: `• HH:MM [attrs] → [Book](link)`
    pub fn descriptions(&self) -> Vec<String> {
        match self {
            Self::ExactMatch { .. } => Vec::new(),
            Self::Alternatives { alternatives, .. } => alternatives
                .iter()
                .map(|alt| {
                    format!("• {} → [Book]({})", alt.slot.describe(), alt.reservation_link)
                })
                .collect(),
        }
    }
}

/// Why a monitor run stopped without finding the preferred time
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Fetching availability failed; the run is over
    #[error("availability fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The cancellation token fired
    #[error("monitor cancelled")]
    Cancelled,
}

impl MonitorError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
