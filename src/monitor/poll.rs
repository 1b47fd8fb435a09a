//! The poll loop
//!
//! One fetch, one diff, zero or one event, then wait for the next tick.
//! Cycles never overlap and the session state is owned by the running loop.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::diff::{diff, DiffOutcome};
use super::{Alternative, AvailabilityFetcher, MonitorError, MonitorEvent, WatchTarget};
use crate::models::{build_reservation_link, PollSnapshot, Slot};

/// Time between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// State carried from one cycle to the next
struct MonitorSession {
    target: WatchTarget,
    previous: PollSnapshot,
    token: String,
    restaurant_id: i64,
}

impl MonitorSession {
    fn new(target: WatchTarget) -> Self {
        Self {
            target,
            previous: PollSnapshot::new(),
            token: String::new(),
            restaurant_id: 0,
        }
    }

    fn link_for(&self, slot: &Slot) -> String {
        build_reservation_link(
            slot,
            self.target.date,
            self.target.party_size,
            &self.token,
            self.restaurant_id,
        )
    }
}

/// Availability monitor driving an [`AvailabilityFetcher`]
///
/// # Example
///
/// ```rust,ignore
/// let monitor = Monitor::new(client);
/// let cancel = CancellationToken::new();
/// let slot = monitor
///     .run(target, &cancel, |event| println!("{:?}", event.kind()))
///     .await?;
/// ```
pub struct Monitor<F> {
    fetcher: F,
    poll_interval: Duration,
}

impl<F: AvailabilityFetcher> Monitor<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the time between polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Poll until the preferred time is bookable
    ///
    /// The first poll runs immediately, later polls follow a recurring
    /// timer. `sink` is called inline for every event and must return
    /// quickly.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::Fetch`] on the first failed fetch (no retry)
    /// - [`MonitorError::Cancelled`] once `cancel` fires, with no further events
    pub async fn run<S>(
        &self,
        target: WatchTarget,
        cancel: &CancellationToken,
        mut sink: S,
    ) -> Result<Slot, MonitorError>
    where
        S: FnMut(MonitorEvent) + Send,
    {
        info!(
            restaurant_id = %target.restaurant_id,
            date = %target.date,
            preferred_time = %target.preferred_time_label(),
            party_size = target.party_size,
            interval_secs = self.poll_interval.as_secs(),
            "Watching availability"
        );

        let mut session = MonitorSession::new(target);

        // First tick completes immediately
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut cycle: u64 = 0;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(cycles = cycle, "Monitor cancelled");
                    return Err(MonitorError::Cancelled);
                }
                _ = ticker.tick() => {}
            }

            cycle += 1;
            if let Some(slot) = self.poll_once(&mut session, cancel, &mut sink, cycle).await? {
                return Ok(slot);
            }
        }
    }

    /// One fetch + diff + emit cycle; `Some` when the run is finished
    async fn poll_once<S>(
        &self,
        session: &mut MonitorSession,
        cancel: &CancellationToken,
        sink: &mut S,
        cycle: u64,
    ) -> Result<Option<Slot>, MonitorError>
    where
        S: FnMut(MonitorEvent) + Send,
    {
        let availability = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(cycle, "Monitor cancelled during fetch");
                return Err(MonitorError::Cancelled);
            }
            result = self.fetcher.fetch(&session.target) => result?,
        };

        session.token = availability.token;
        session.restaurant_id = availability.restaurant_id;
        let current = PollSnapshot::from_slots(availability.slots);
        debug!(cycle, slots = current.len(), "Fetched availability");

        match diff(&session.previous, &current, session.target.preferred_time) {
            DiffOutcome::ExactMatch(slot) => {
                let reservation_link = session.link_for(&slot);
                info!(
                    date = %session.target.date,
                    time = %slot.time_label(),
                    link = %reservation_link,
                    "Exact slot found"
                );
                sink(MonitorEvent::ExactMatch {
                    slot: slot.clone(),
                    reservation_link,
                });
                return Ok(Some(slot));
            }
            DiffOutcome::Changed { added, removed } => {
                if session.previous.is_empty() {
                    info!(
                        preferred_time = %session.target.preferred_time_label(),
                        alternatives = current.len(),
                        "Preferred time unavailable"
                    );
                }

                if !added.is_empty() {
                    info!(count = added.len(), "New slots");
                    let alternatives: Vec<Alternative> = added
                        .into_iter()
                        .map(|slot| {
                            let reservation_link = session.link_for(&slot);
                            info!(
                                slot = %slot.describe(),
                                link = %reservation_link,
                                "Slot available"
                            );
                            Alternative {
                                slot,
                                reservation_link,
                            }
                        })
                        .collect();
                    let reservation_link = alternatives[0].reservation_link.clone();
                    sink(MonitorEvent::Alternatives {
                        alternatives,
                        reservation_link,
                    });
                }

                for slot in &removed {
                    info!(
                        slot = %slot.describe(),
                        slot_hash = %slot.slot_hash(),
                        "Slot disappeared"
                    );
                }
            }
            DiffOutcome::NoChange => {
                debug!(cycle, "No change");
            }
        }

        session.previous = current;
        Ok(None)
    }
}
