use std::time::Duration;

use tokio_stream::StreamExt;

use crate::kernel::scope::Scope;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::status::{PluginStatus, StatusTracker};

use super::support::{counter_registry, COUNTER_TYPE};

#[test]
fn test_status_display() {
    assert_eq!(PluginStatus::Idle.to_string(), "Idle");
    assert_eq!(PluginStatus::Error.to_string(), "Error");
    assert_eq!(PluginStatus::default(), PluginStatus::Idle);
}

#[tokio::test]
async fn test_repeated_status_emits_nothing() {
    let tracker = StatusTracker::new("t");
    let mut stream = tracker.subscribe().expect("first subscriber gets the stream");

    assert!(tracker.set(PluginStatus::Running, None));
    assert!(!tracker.set(PluginStatus::Running, None));
    assert!(tracker.set(PluginStatus::Stopped, None));
    assert!(!tracker.set(PluginStatus::Stopped, None));
    drop(tracker);

    let statuses: Vec<_> = (&mut stream).map(|e| e.status).collect().await;
    assert_eq!(statuses, vec![PluginStatus::Running, PluginStatus::Stopped]);
}

#[tokio::test]
async fn test_error_events_carry_the_cause() {
    let tracker = StatusTracker::new("t");
    let mut stream = tracker.subscribe().unwrap();
    tracker.set(
        PluginStatus::Error,
        Some(PluginSystemError::lifecycle("t", "start", "port in use")),
    );

    let event = stream.next().await.unwrap();
    assert_eq!(event.status, PluginStatus::Error);
    assert!(event.error.unwrap().to_string().contains("port in use"));
}

#[test]
fn test_only_one_subscriber() {
    let tracker = StatusTracker::new("t");
    assert!(tracker.subscribe().is_some());
    assert!(tracker.subscribe().is_none());
}

#[tokio::test]
async fn test_full_channel_drops_newest_without_blocking() {
    let tracker = StatusTracker::with_capacity("t", 2);
    let mut stream = tracker.subscribe().unwrap();

    // Idle -> Running -> Stopped fill the channel; the rest are dropped.
    let sequence = [
        PluginStatus::Running,
        PluginStatus::Stopped,
        PluginStatus::Running,
        PluginStatus::Error,
    ];
    for status in sequence {
        assert!(tracker.set(status, None), "set must never block or fail");
    }
    assert_eq!(tracker.status(), PluginStatus::Error);

    let first = stream.next().await.unwrap().status;
    let second = stream.next().await.unwrap().status;
    assert_eq!((first, second), (PluginStatus::Running, PluginStatus::Stopped));
    let nothing_more = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
    assert!(nothing_more.is_err());
}

#[tokio::test]
async fn test_start_and_stop_yield_running_then_stopped() {
    let registry = counter_registry();
    let instance = registry.create_instance(COUNTER_TYPE, "c1", None, None).unwrap();
    let mut stream = instance.status_notify().unwrap();
    let scope = Scope::background();

    instance.start(&scope).await.unwrap();
    assert!(matches!(
        instance.start(&scope).await,
        Err(PluginSystemError::AlreadyRunning { .. })
    ));
    instance.stop(&scope).await.unwrap();
    instance.stop(&scope).await.unwrap();

    assert_eq!(stream.next().await.unwrap().status, PluginStatus::Running);
    assert_eq!(stream.next().await.unwrap().status, PluginStatus::Stopped);
    assert!(tokio::time::timeout(Duration::from_millis(50), stream.next()).await.is_err());
    assert!(instance.status_notify().is_none());
}
