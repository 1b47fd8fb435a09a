//! tablewatch - OpenTable reservation availability monitor
//!
//! Polls OpenTable for a restaurant, date and party size, diffs the bookable
//! slots against the previous poll and notifies when the preferred time or
//! new alternatives appear.
//!
//! # Architecture
//!
//! - [`models`] - Slot, snapshot and restaurant types, reservation links
//! - [`monitor`] - Poll loop, diff engine and the fetcher contract
//! - [`opentable`] - OpenTable session, availability and search queries
//! - [`notifications`] - Discord and console delivery
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use tablewatch::config::Config;
//! use tablewatch::monitor::{Monitor, WatchTarget};
//! use tablewatch::opentable::OpenTableClient;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = OpenTableClient::connect(&config.opentable).await?;
//!     let target = WatchTarget::new(
//!         "1234",
//!         chrono::NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
//!         chrono::NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
//!         2,
//!     );
//!
//!     let monitor = Monitor::new(client).with_poll_interval(config.poll_interval());
//!     let slot = monitor
//!         .run(target, &CancellationToken::new(), |event| println!("{event:?}"))
//!         .await?;
//!     println!("booked slot available at {}", slot.time_label());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notifications;
pub mod opentable;
pub mod utils;

// Direct re-exports for convenience
pub use models::{PollSnapshot, Slot};
