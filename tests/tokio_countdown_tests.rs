//! Real-time tests for the tokio-driven countdown.
//!
//! These tests run the engine on a live runtime with a monotonic clock:
//! - A short countdown finishing through the event channel
//! - Finishing no earlier than the configured length
//! - Pause stopping all progress
//! - Reset cancelling a pending completion
//! - Construction outside a runtime

use std::time::{Duration, Instant};

use tokio::time::{sleep, timeout};

use countdown::{CountdownConfig, CountdownError, CountdownEvent, CountdownStatus, TokioCountdown};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_engine(duration_ms: u64, interval_ms: u64) -> TokioCountdown {
    let config = CountdownConfig::default()
        .with_duration_ms(duration_ms)
        .with_heartbeat_interval_ms(interval_ms);
    TokioCountdown::with_tokio(config).unwrap()
}

// ============================================================================
// Completion
// ============================================================================

#[tokio::test]
async fn short_countdown_reports_started_then_finished() {
    let engine = create_engine(100, 10);
    let mut events = engine.subscribe();

    engine.start().unwrap();

    let first = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
    assert_eq!(first, Some(CountdownEvent::Started { remaining_ms: 100 }));

    let second = timeout(Duration::from_secs(5), events.recv()).await.unwrap();
    assert_eq!(second, Some(CountdownEvent::Finished));

    assert_eq!(engine.status(), CountdownStatus::Finished);
    assert_eq!(engine.remaining_ms(), 0);
}

#[tokio::test]
async fn countdown_never_finishes_early() {
    let engine = create_engine(200, 15);
    let mut events = engine.subscribe();

    let started_at = Instant::now();
    engine.start().unwrap();

    let finished = timeout(Duration::from_secs(5), async {
        while let Some(event) = events.recv().await {
            if event == CountdownEvent::Finished {
                return true;
            }
        }
        false
    })
    .await
    .unwrap();

    assert!(finished);
    assert!(started_at.elapsed() >= Duration::from_millis(200));
}

// ============================================================================
// Pause and reset
// ============================================================================

#[tokio::test]
async fn pause_stops_progress() {
    let engine = create_engine(10_000, 10);
    engine.start().unwrap();
    sleep(Duration::from_millis(50)).await;

    engine.pause().unwrap();
    let frozen = engine.remaining_ms();
    assert!(frozen < 10_000);
    assert_eq!(engine.status(), CountdownStatus::Idle);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.remaining_ms(), frozen);
}

#[tokio::test]
async fn reset_cancels_pending_completion() {
    let engine = create_engine(80, 10);
    let mut events = engine.subscribe();

    engine.start().unwrap();
    sleep(Duration::from_millis(20)).await;
    engine.reset().unwrap();

    sleep(Duration::from_millis(200)).await;

    assert_eq!(engine.status(), CountdownStatus::Idle);
    assert_eq!(engine.remaining_ms(), 80);
    while let Ok(event) = events.try_recv() {
        assert_ne!(event, CountdownEvent::Finished);
    }
}

#[tokio::test]
async fn dispose_closes_event_channel() {
    let engine = create_engine(10_000, 10);
    let mut events = engine.subscribe();
    engine.start().unwrap();

    engine.dispose();

    let mut received = Vec::new();
    while let Some(event) = timeout(Duration::from_secs(5), events.recv()).await.unwrap() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![CountdownEvent::Started {
            remaining_ms: 10_000
        }]
    );
    assert!(engine.is_disposed());
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn construction_outside_runtime_fails() {
    let result = TokioCountdown::with_tokio(CountdownConfig::default());
    assert!(matches!(result, Err(CountdownError::SchedulerUnavailable(_))));
}
