//! Full pipeline against local UDP servers speaking A2S_INFO

use std::sync::Arc;
use std::time::Duration;

use popwatch::{
    ServerStatus, actors::poller::PollerHandle, query::A2sClient, resolver::DnsResolver,
};
use pretty_assertions::assert_eq;

use crate::helpers::*;

#[tokio::test]
async fn test_real_client_against_local_servers() {
    let port_a = spawn_udp_server(a2s_info_packet("pug A", 6, 10)).await;
    let port_b = spawn_udp_server(a2s_info_packet("pug B", 0, 10)).await;

    let mut config = test_config(vec![port_a, port_b]);
    config.hostname = "127.0.0.1".to_string();
    config.query_timeout = Duration::from_secs(2);

    let (handle, mut subscriber) =
        PollerHandle::start(&config, &DnsResolver, Arc::new(A2sClient::new()))
            .await
            .unwrap();

    let event = subscriber.next_update().await.unwrap();

    let statuses: Vec<_> = event.statuses().cloned().collect();
    assert_eq!(
        statuses,
        vec![
            ServerStatus::new("pug A", 6, 10),
            ServerStatus::new("pug B", 0, 10)
        ]
    );
    assert!(event.alert_triggered);

    handle.shutdown().await.unwrap();
    handle.stopped().await;
}

#[tokio::test]
async fn test_silent_and_garbage_servers_become_placeholders() {
    let port_ok = spawn_udp_server(a2s_info_packet("pug", 2, 10)).await;
    let (_silent, port_silent) = silent_udp_server().await;
    let port_garbage = spawn_udp_server(b"\xFF\xFF\xFF\xFFzzz".to_vec()).await;

    let mut config = test_config(vec![port_ok, port_silent, port_garbage]);
    config.hostname = "127.0.0.1".to_string();
    config.query_timeout = Duration::from_millis(300);

    let (handle, mut subscriber) =
        PollerHandle::start(&config, &DnsResolver, Arc::new(A2sClient::new()))
            .await
            .unwrap();

    let event = subscriber.next_update().await.unwrap();

    assert_eq!(event.servers.len(), 3);
    assert_eq!(event.servers[0].status, ServerStatus::new("pug", 2, 10));
    assert!(event.servers[1].status.is_placeholder());
    assert!(
        event.servers[1]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("timed out"))
    );
    assert!(event.servers[2].status.is_placeholder());
    assert!(
        event.servers[2]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("malformed"))
    );

    handle.shutdown().await.unwrap();
    handle.stopped().await;
}
