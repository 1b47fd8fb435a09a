//! Poll loop scenarios driven by a scripted fetcher on paused time

mod common;

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use common::{availability, cancel_after, slot, target, ScriptedFetcher};
use tablewatch::monitor::{Monitor, MonitorError, MonitorEvent};
use tablewatch::utils::error::FetchError;

const TEN_MINUTES: Duration = Duration::from_secs(600);

fn alternative_times(event: &MonitorEvent) -> Vec<String> {
    match event {
        MonitorEvent::Alternatives { alternatives, .. } => alternatives
            .iter()
            .map(|a| a.slot.time_label())
            .collect(),
        MonitorEvent::ExactMatch { .. } => panic!("expected alternatives, got {event:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_cycle_reports_initial_availability() {
    let fetcher = ScriptedFetcher::new(vec![availability(vec![
        slot("18:30", "A"),
        slot("19:00", "B"),
    ])]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();
    cancel_after(&cancel, TEN_MINUTES);

    let mut events = Vec::new();
    let result = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert!(matches!(result, Err(MonitorError::Cancelled)));
    assert_eq!(events.len(), 1);
    assert_eq!(alternative_times(&events[0]), vec!["18:30", "19:00"]);
    assert!(events[0].reservation_link().contains("slotHash=A"));
}

#[tokio::test(start_paused = true)]
async fn test_exact_match_ends_run() {
    let fetcher = ScriptedFetcher::new(vec![availability(vec![
        slot("17:30", "W"),
        slot("18:00", "X"),
    ])]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();

    let mut events = Vec::new();
    let found = monitor
        .run(target("18:00"), &cancel, |e| events.push(e))
        .await
        .unwrap();

    assert_eq!(found.slot_hash(), "X");
    assert_eq!(events.len(), 1);
    match &events[0] {
        MonitorEvent::ExactMatch {
            slot,
            reservation_link,
        } => {
            assert_eq!(slot.time_label(), "18:00");
            assert!(reservation_link.contains("dateTime=2025-07-04T18%3A00%3A00"));
            assert!(reservation_link.contains("slotHash=X"));
        }
        other => panic!("expected exact match, got {other:?}"),
    }
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_only_new_slots_reported() {
    let fetcher = ScriptedFetcher::new(vec![
        availability(vec![slot("18:30", "A")]),
        availability(vec![slot("18:30", "A"), slot("19:00", "B")]),
    ]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();
    cancel_after(&cancel, TEN_MINUTES);

    let mut events = Vec::new();
    let result = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert!(matches!(result, Err(MonitorError::Cancelled)));
    assert_eq!(events.len(), 2);
    assert_eq!(alternative_times(&events[0]), vec!["18:30"]);
    assert_eq!(alternative_times(&events[1]), vec!["19:00"]);
    assert!(events[1].reservation_link().contains("slotHash=B"));
}

#[tokio::test(start_paused = true)]
async fn test_removal_emits_nothing() {
    let fetcher = ScriptedFetcher::new(vec![
        availability(vec![slot("18:30", "A")]),
        availability(vec![]),
    ]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();
    cancel_after(&cancel, TEN_MINUTES);

    let mut events = Vec::new();
    let _ = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert_eq!(events.len(), 1);
    assert_eq!(fetcher.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_identity_change_at_same_time_is_reported() {
    let fetcher = ScriptedFetcher::new(vec![
        availability(vec![slot("18:30", "A")]),
        availability(vec![slot("18:30", "A2")]),
    ]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();
    cancel_after(&cancel, TEN_MINUTES);

    let mut events = Vec::new();
    let _ = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert_eq!(events.len(), 2);
    assert!(events[1].reservation_link().contains("slotHash=A2"));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_first_fetch() {
    let fetcher = ScriptedFetcher::new(vec![availability(vec![slot("18:00", "X")])]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut events = Vec::new();
    let result = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert!(matches!(result, Err(MonitorError::Cancelled)));
    assert!(events.is_empty());
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_fetch() {
    // Empty script: the first fetch never returns
    let fetcher = ScriptedFetcher::new(vec![]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_secs(5));

    let mut events = Vec::new();
    let result = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert!(matches!(result, Err(MonitorError::Cancelled)));
    assert!(events.is_empty());
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_wait() {
    let fetcher = ScriptedFetcher::new(vec![
        availability(vec![slot("18:30", "A")]),
        availability(vec![slot("18:00", "X")]),
    ]);
    let monitor = Monitor::new(fetcher.clone()).with_poll_interval(Duration::from_secs(60));
    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_secs(30));

    let mut events = Vec::new();
    let result = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert!(matches!(result, Err(MonitorError::Cancelled)));
    assert_eq!(events.len(), 1);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_ends_run() {
    let fetcher = ScriptedFetcher::new(vec![
        availability(vec![slot("18:30", "A")]),
        Err(FetchError::ServerError(503)),
        availability(vec![slot("18:00", "X")]),
    ]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();

    let mut events = Vec::new();
    let result = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert!(matches!(
        result,
        Err(MonitorError::Fetch(FetchError::ServerError(503)))
    ));
    assert_eq!(events.len(), 1);
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_polls_follow_interval() {
    let fetcher = ScriptedFetcher::new(vec![
        availability(vec![]),
        availability(vec![]),
        availability(vec![slot("18:00", "X")]),
    ]);
    let monitor = Monitor::new(fetcher.clone()).with_poll_interval(Duration::from_secs(60));
    let cancel = CancellationToken::new();

    let result = monitor.run(target("18:00"), &cancel, |_| {}).await;
    assert!(result.is_ok());

    let times = fetcher.call_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[1] - times[0], Duration::from_secs(60));
    assert_eq!(times[2] - times[1], Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_empty_availability_emits_nothing() {
    let fetcher = ScriptedFetcher::new(vec![availability(vec![]), availability(vec![])]);
    let monitor = Monitor::new(fetcher.clone());
    let cancel = CancellationToken::new();
    cancel_after(&cancel, TEN_MINUTES);

    let mut events = Vec::new();
    let _ = monitor.run(target("18:00"), &cancel, |e| events.push(e)).await;

    assert!(events.is_empty());
    assert_eq!(fetcher.call_count(), 3);
}
