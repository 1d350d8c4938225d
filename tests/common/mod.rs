#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use kiro_sdk_rs::{KiroSdkConfig, ReconnectPolicy, RetryPolicy};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const WELCOME: &str = r#"{"type":"welcome","message":"Connected to Kiro IDE Server 2.0"}"#;

#[derive(Clone, Debug)]
enum Command {
    Text(String),
    Close,
}

/// Local WebSocket server that greets every client the way the Kiro server
/// does, records inbound text frames and broadcasts on demand.
pub struct SocketServer {
    pub url: String,
    connections: Arc<AtomicUsize>,
    commands: broadcast::Sender<Command>,
    inbound: Mutex<mpsc::UnboundedReceiver<String>>,
    acceptor: JoinHandle<()>,
}

impl SocketServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());

        let connections = Arc::new(AtomicUsize::new(0));
        let (commands, _) = broadcast::channel(64);
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let acceptor = {
            let connections = Arc::clone(&connections);
            let commands = commands.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    // Subscribe before the handshake so nothing sent after
                    // the client's connect() returns is missed.
                    let mut rx = commands.subscribe();
                    let inbound_tx = inbound_tx.clone();
                    let connections = Arc::clone(&connections);

                    tokio::spawn(async move {
                        let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                            return;
                        };
                        connections.fetch_add(1, Ordering::SeqCst);
                        let _ = ws.send(Message::Text(WELCOME.into())).await;

                        loop {
                            tokio::select! {
                                command = rx.recv() => match command {
                                    Ok(Command::Text(text)) => {
                                        let _ = ws.send(Message::Text(text.into())).await;
                                    }
                                    Ok(Command::Close) | Err(_) => {
                                        let _ = ws.close(None).await;
                                        return;
                                    }
                                },
                                frame = ws.next() => match frame {
                                    Some(Ok(Message::Text(text))) => {
                                        let _ = inbound_tx.send(text.as_str().to_string());
                                    }
                                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                                    Some(Ok(_)) => {}
                                },
                            }
                        }
                    });
                }
            })
        };

        Self {
            url,
            connections,
            commands,
            inbound: Mutex::new(inbound_rx),
            acceptor,
        }
    }

    /// Completed handshakes so far.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn broadcast(&self, text: &str) {
        let _ = self.commands.send(Command::Text(text.to_string()));
    }

    /// Closes every open connection; new ones are still accepted.
    pub fn close_all(&self) {
        let _ = self.commands.send(Command::Close);
    }

    /// Closes every connection and stops listening.
    pub fn shutdown(&self) {
        self.close_all();
        self.acceptor.abort();
    }

    pub async fn next_message(&self) -> Option<String> {
        let mut inbound = self.inbound.lock().await;
        tokio::time::timeout(Duration::from_secs(2), inbound.recv())
            .await
            .ok()
            .flatten()
    }

    pub async fn wait_for_connections(&self, count: usize) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
        while tokio::time::Instant::now() < deadline {
            if self.connection_count() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for SocketServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn health_body() -> serde_json::Value {
    json!({
        "server": "running",
        "database": "connected (in-memory)",
        "services": ["planning", "workflow", "docs", "execution"]
    })
}

pub async fn mount_health(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/kiro/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_body()))
        .mount(server)
        .await;
}

/// Config pointing at the mocks, with fast retries and reconnects.
pub fn config(api_url: &str, ws_url: &str) -> KiroSdkConfig {
    KiroSdkConfig {
        api_url: api_url.to_string(),
        ws_url: ws_url.to_string(),
        timeout_ms: 2000,
        retry_policy: RetryPolicy::none(),
        reconnect: ReconnectPolicy::new(2, 20),
        ..Default::default()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
