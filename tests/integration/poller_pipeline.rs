//! End-to-end tests: resolve → poll → decide → publish

use std::time::Duration;

use popwatch::{ServerStatus, actors::messages::SchedulerState, config::AlertPolicy};
use pretty_assertions::assert_eq;

use crate::helpers::*;

#[tokio::test]
async fn test_occupied_server_triggers_alert() {
    let client = ScriptedQuery::new(vec![
        (PORT_A, status("A", 6, 10)),
        (PORT_B, status("B", 0, 10)),
    ]);
    let config = test_config(vec![PORT_A, PORT_B]);

    let (handle, mut subscriber) = start_scripted(client, &config).await.unwrap();

    let event = subscriber.next_update().await.unwrap();

    let statuses: Vec<_> = event.statuses().cloned().collect();
    assert_eq!(
        statuses,
        vec![ServerStatus::new("A", 6, 10), ServerStatus::new("B", 0, 10)]
    );
    assert!(event.alert_triggered);

    handle.shutdown().await.unwrap();
    handle.stopped().await;
}

#[tokio::test]
async fn test_repeat_within_cooldown_publishes_without_alert() {
    let client = ScriptedQuery::new(vec![
        (PORT_A, status("A", 6, 10)),
        (PORT_B, status("B", 0, 10)),
    ]);
    let config = test_config(vec![PORT_A, PORT_B]);

    let (handle, mut subscriber) = start_scripted(client, &config).await.unwrap();
    let first = subscriber.next_update().await.unwrap();
    assert!(first.alert_triggered);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let second = handle.poll_now().await.unwrap();

    assert!(!second.alert_triggered);
    assert_eq!(second.servers.len(), 2);
    assert_eq!(second.servers[0].status, ServerStatus::new("A", 6, 10));

    // the subscriber sees the same round the caller got back
    let published = subscriber.next_update().await.unwrap();
    assert_eq!(published.sequence, second.sequence);
    assert!(!published.alert_triggered);

    handle.shutdown().await.unwrap();
    handle.stopped().await;
}

#[tokio::test]
async fn test_events_arrive_in_round_order() {
    let client = ScriptedQuery::new(vec![(PORT_A, status("A", 1, 10))]);
    let mut config = test_config(vec![PORT_A]);
    config.interval = Duration::from_millis(10);

    let (handle, mut subscriber) = start_scripted(client, &config).await.unwrap();

    let mut last = 0;
    for _ in 0..5 {
        let event = subscriber.next_update().await.unwrap();
        assert!(event.sequence > last, "sequence must strictly increase");
        last = event.sequence;
    }

    handle.shutdown().await.unwrap();
    handle.stopped().await;
}

#[tokio::test]
async fn test_quiet_rounds_never_alert() {
    let client = ScriptedQuery::new(vec![
        (PORT_A, status("A", 5, 10)),
        (PORT_B, status("B", 11, 12)),
    ]);
    let config = test_config(vec![PORT_A, PORT_B]);

    let (handle, mut subscriber) = start_scripted(client, &config).await.unwrap();

    assert!(!subscriber.next_update().await.unwrap().alert_triggered);
    assert!(!handle.poll_now().await.unwrap().alert_triggered);

    handle.shutdown().await.unwrap();
    handle.stopped().await;
}

#[tokio::test]
async fn test_alert_fires_once_server_fills_up() {
    let client = ScriptedQuery::new(vec![(PORT_A, status("A", 2, 10))]);
    let config = test_config(vec![PORT_A]);

    let (handle, mut subscriber) = start_scripted(client.clone(), &config).await.unwrap();
    assert!(!subscriber.next_update().await.unwrap().alert_triggered);

    client.set(PORT_A, status("A", 7, 10));
    assert!(handle.poll_now().await.unwrap().alert_triggered);
    assert!(!handle.poll_now().await.unwrap().alert_triggered);

    handle.shutdown().await.unwrap();
    handle.stopped().await;
}

#[tokio::test]
async fn test_fast_policy_alerts_on_single_player() {
    let client = ScriptedQuery::new(vec![(PORT_A, status("A", 1, 10))]);
    let config = test_config(vec![PORT_A]).with_policy(AlertPolicy::fast());

    let (handle, mut subscriber) = start_scripted(client, &config).await.unwrap();

    assert!(subscriber.next_update().await.unwrap().alert_triggered);

    handle.shutdown().await.unwrap();
    handle.stopped().await;
}

#[tokio::test]
async fn test_handle_exposes_endpoints_for_presentation() {
    let client = ScriptedQuery::new(vec![(PORT_A, status("A", 1, 10))]);
    let config = test_config(vec![PORT_A, PORT_B]);

    let (handle, mut subscriber) = start_scripted(client, &config).await.unwrap();

    let ports: Vec<_> = handle.endpoints().iter().map(|e| e.port).collect();
    assert_eq!(ports, vec![PORT_A, PORT_B]);

    let event = subscriber.next_update().await.unwrap();
    assert_eq!(
        event.servers[0].connect_uri(),
        format!("steam://connect/127.0.0.1:{PORT_A}")
    );

    handle.shutdown().await.unwrap();
    handle.stopped().await;
    assert_eq!(handle.state(), SchedulerState::Stopped);
}
