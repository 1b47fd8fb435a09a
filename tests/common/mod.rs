//! Common test utilities

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use tablewatch::models::Slot;
use tablewatch::monitor::{Availability, AvailabilityFetcher, WatchTarget};
use tablewatch::utils::error::FetchError;

/// Parse `HH:MM`
pub fn t(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

/// Slot at `time` with identity `hash`
pub fn slot(time: &str, hash: &str) -> Slot {
    Slot::new(t(time), hash).with_attributes(["default"])
}

/// Target for restaurant 1234 on 2025-07-04, party of 2
pub fn target(preferred: &str) -> WatchTarget {
    WatchTarget::new(
        "1234",
        NaiveDate::from_ymd_opt(2025, 7, 4).unwrap(),
        t(preferred),
        2,
    )
}

/// Successful fetch result with a fixed token and numeric id
pub fn availability(slots: Vec<Slot>) -> Result<Availability, FetchError> {
    Ok(Availability {
        slots,
        token: "tok".to_string(),
        restaurant_id: 1234,
    })
}

/// Fetcher replaying a fixed script, then hanging until cancelled
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<VecDeque<Result<Availability, FetchError>>>>,
    calls: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Result<Availability, FetchError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Instants at which each fetch started
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvailabilityFetcher for ScriptedFetcher {
    async fn fetch(&self, _target: &WatchTarget) -> Result<Availability, FetchError> {
        self.calls.lock().unwrap().push(Instant::now());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

/// Cancel `token` after `after` has elapsed
pub fn cancel_after(token: &CancellationToken, after: Duration) {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        token.cancel();
    });
}
