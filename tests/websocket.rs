mod common;

use common::{SocketServer, init_tracing};
use kiro_sdk_rs::{EventType, KiroEvent, ReconnectPolicy, SocketState, WebSocketManager};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

async fn next_event(rx: &mut UnboundedReceiver<KiroEvent>) -> KiroEvent {
    tokio::time::timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn wait_for_state(manager: &WebSocketManager, expected: SocketState) -> bool {
    let mut states = manager.state_changes();
    tokio::time::timeout(
        Duration::from_secs(3),
        states.wait_for(|state| *state == expected),
    )
    .await
    .is_ok()
}

#[tokio::test]
async fn test_connect_dispatches_connected_then_welcome() {
    init_tracing();
    let server = SocketServer::start().await;
    let manager = WebSocketManager::new(&server.url, ReconnectPolicy::new(2, 20));
    let (_all, mut events) = manager.events("*");

    manager.connect().await.unwrap();
    assert!(manager.is_connected());

    let connected = next_event(&mut events).await;
    assert_eq!(connected.event_type, EventType::Connected);
    assert_eq!(connected.source, "websocket");
    assert_eq!(connected.data, json!({"status": "connected"}));

    let welcome = next_event(&mut events).await;
    assert_eq!(welcome.event_type, EventType::Welcome);
    assert_eq!(welcome.source, "kiro-server");
    assert_eq!(welcome.data["message"], "Connected to Kiro IDE Server 2.0");
    assert!(welcome.id.starts_with("ws-"));

    manager.disconnect();
}

#[tokio::test]
async fn test_frames_are_normalized_and_routed_by_type() {
    let server = SocketServer::start().await;
    let manager = WebSocketManager::new(&server.url, ReconnectPolicy::new(2, 20));
    let (_created, mut created) = manager.events("plan:created");
    let updates = Arc::new(AtomicUsize::new(0));
    let _updated = {
        let updates = Arc::clone(&updates);
        manager.subscribe("plan:updated", move |_| {
            updates.fetch_add(1, Ordering::SeqCst);
        })
    };

    manager.connect().await.unwrap();
    server.broadcast("definitely not json");
    server.broadcast(
        r#"{"type":"plan:created","data":{"id":"p1"},"timestamp":"2025-01-01T00:00:00.000Z"}"#,
    );

    let event = next_event(&mut created).await;
    assert_eq!(event.event_type, EventType::PlanCreated);
    assert_eq!(event.data, json!({"id": "p1"}));
    assert_eq!(event.timestamp, "2025-01-01T00:00:00.000Z");
    assert_eq!(updates.load(Ordering::SeqCst), 0);

    manager.disconnect();
}

#[tokio::test]
async fn test_send_reaches_server() {
    let server = SocketServer::start().await;
    let manager = WebSocketManager::new(&server.url, ReconnectPolicy::new(2, 20));
    manager.connect().await.unwrap();

    assert!(manager.send(&json!({"type": "ping"})));
    assert_eq!(
        server.next_message().await.as_deref(),
        Some(r#"{"type":"ping"}"#)
    );

    manager.disconnect();
    assert!(!manager.send(&json!({"type": "ping"})));
}

#[tokio::test]
async fn test_reconnects_after_server_close() {
    let server = SocketServer::start().await;
    let manager = WebSocketManager::new(&server.url, ReconnectPolicy::new(3, 20));
    let (_connected, mut connected) = manager.events("kiro:connected");

    manager.connect().await.unwrap();
    next_event(&mut connected).await;

    server.close_all();

    next_event(&mut connected).await;
    assert!(server.wait_for_connections(2).await);
    assert!(manager.is_connected());
    assert_eq!(manager.reconnect_attempts(), 0);

    manager.disconnect();
}

#[tokio::test]
async fn test_no_reconnect_after_disconnect() {
    let server = SocketServer::start().await;
    let manager = WebSocketManager::new(&server.url, ReconnectPolicy::new(3, 20));

    manager.connect().await.unwrap();
    assert!(server.wait_for_connections(1).await);

    manager.disconnect();
    // A close arriving after disconnect must not revive the socket.
    server.close_all();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(server.connection_count(), 1);
    assert_eq!(manager.state(), SocketState::Stopped);
}

#[tokio::test]
async fn test_gives_up_when_server_is_gone() {
    let server = SocketServer::start().await;
    let manager = WebSocketManager::new(&server.url, ReconnectPolicy::new(2, 20));

    manager.connect().await.unwrap();
    server.shutdown();

    assert!(wait_for_state(&manager, SocketState::Stopped).await);
    assert_eq!(manager.reconnect_attempts(), 2);
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_connect_again_after_disconnect() {
    let server = SocketServer::start().await;
    let manager = WebSocketManager::new(&server.url, ReconnectPolicy::new(2, 20));

    manager.connect().await.unwrap();
    manager.disconnect();
    manager.connect().await.unwrap();

    assert!(manager.is_connected());
    assert!(server.wait_for_connections(2).await);

    // Already connected: no second socket.
    manager.connect().await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.connection_count(), 2);

    manager.disconnect();
}

#[tokio::test]
async fn test_disconnect_drops_subscriptions() {
    let server = SocketServer::start().await;
    let manager = WebSocketManager::new(&server.url, ReconnectPolicy::new(2, 20));
    let _all = manager.subscribe("*", |_| {});
    let _plans = manager.subscribe("plan:created", |_| {});

    manager.connect().await.unwrap();
    assert_eq!(manager.router().event_type_count(), 2);

    manager.disconnect();
    assert_eq!(manager.router().subscriber_count("*"), 0);
    assert_eq!(manager.router().event_type_count(), 0);
}
