use super::{SocketState, WebSocketFactory, WsStream};
use crate::infrastructure::{ReconnectPolicy, ReconnectTimer, TaskManager};
use crate::messaging::{EventRouter, EventType, KiroEvent, Subscription};
use crate::types::constants::WRITE_QUEUE_SIZE;
use crate::types::{KiroError, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::tungstenite::Message;

/// Real-time event socket with subscription routing and automatic
/// reconnection.
///
/// A single supervisor task owns the socket for its whole life: it connects,
/// reads frames into the [`EventRouter`], and after an unplanned close waits
/// out the [`ReconnectPolicy`] backoff before trying again. Lifecycle changes
/// are published as [`SocketState`] through a watch channel.
///
/// Each `connect()` that starts a supervisor stamps it with a new generation;
/// `disconnect()` bumps the generation so a supervisor that is still
/// unwinding can neither publish state nor schedule a reconnect.
#[derive(Clone)]
pub struct WebSocketManager {
    shared: Arc<Shared>,
}

struct Shared {
    url: String,
    policy: ReconnectPolicy,
    router: EventRouter,
    state_tx: watch::Sender<SocketState>,
    writer: Mutex<Option<mpsc::Sender<Message>>>,
    should_reconnect: AtomicBool,
    generation: AtomicU64,
    reconnect_attempts: AtomicU32,
    tasks: Mutex<TaskManager>,
}

impl Shared {
    fn writer(&self) -> MutexGuard<'_, Option<mpsc::Sender<Message>>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tasks(&self) -> MutexGuard<'_, TaskManager> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Publishes `state` unless a newer connect/disconnect took over.
    fn publish(&self, generation: u64, state: SocketState) -> bool {
        self.state_tx.send_if_modified(|current| {
            if !self.is_current(generation) || *current == state {
                return false;
            }
            tracing::debug!("WebSocket state: {} -> {}", current, state);
            *current = state;
            true
        })
    }
}

impl WebSocketManager {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        let (state_tx, _) = watch::channel(SocketState::Idle);

        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                policy,
                router: EventRouter::new(),
                state_tx,
                writer: Mutex::new(None),
                should_reconnect: AtomicBool::new(true),
                generation: AtomicU64::new(0),
                reconnect_attempts: AtomicU32::new(0),
                tasks: Mutex::new(TaskManager::new()),
            }),
        }
    }

    /// Opens the socket and waits for the first handshake.
    ///
    /// Returns immediately if the socket is already connecting, connected or
    /// backing off. If the first handshake fails the error is returned while
    /// the supervisor keeps retrying in the background within the reconnect
    /// budget. Calling this after [`disconnect`](Self::disconnect) re-enables
    /// automatic reconnection.
    pub async fn connect(&self) -> Result<()> {
        let shared = &self.shared;
        let mut generation = 0;

        let claimed = shared.state_tx.send_if_modified(|state| {
            if state.is_active() {
                return false;
            }
            generation = shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = SocketState::Connecting;
            true
        });
        if !claimed {
            tracing::debug!("WebSocket already {}, skipping connect", self.state());
            return Ok(());
        }

        shared.should_reconnect.store(true, Ordering::SeqCst);
        shared.reconnect_attempts.store(0, Ordering::SeqCst);

        let (first_tx, first_rx) = oneshot::channel();
        shared
            .tasks()
            .spawn(supervise(Arc::clone(shared), generation, first_tx));

        match first_rx.await {
            Ok(result) => result,
            Err(_) => Err(KiroError::Connection(
                "WebSocket supervisor stopped before the handshake completed".to_string(),
            )),
        }
    }

    /// Closes the socket and stops reconnecting.
    ///
    /// A close frame is sent best-effort, the supervisor is aborted and every
    /// subscription is dropped.
    pub fn disconnect(&self) {
        let shared = &self.shared;
        shared.should_reconnect.store(false, Ordering::SeqCst);
        shared.state_tx.send_modify(|state| {
            shared.generation.fetch_add(1, Ordering::SeqCst);
            *state = SocketState::Stopped;
        });

        // Dropping the sender lets the write task flush and close the sink.
        shared.writer().take();
        shared.tasks().abort_all();
        shared.router.clear();
        shared.reconnect_attempts.store(0, Ordering::SeqCst);

        tracing::info!("WebSocket disconnected");
    }

    /// Serializes `data` as JSON and queues it as a text frame.
    ///
    /// Returns `false` and logs a warning when the socket is not connected or
    /// the outbound queue is full; nothing is buffered for later delivery.
    pub fn send<T: Serialize + ?Sized>(&self, data: &T) -> bool {
        if !self.is_connected() {
            tracing::warn!("WebSocket not connected, cannot send message");
            return false;
        }

        let json = match serde_json::to_string(data) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize WebSocket message: {}", e);
                return false;
            }
        };

        let writer = self.shared.writer();
        let Some(tx) = writer.as_ref() else {
            tracing::warn!("WebSocket not connected, cannot send message");
            return false;
        };

        match tx.try_send(Message::Text(json.into())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("WebSocket write queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("WebSocket writer closed, dropping message");
                false
            }
        }
    }

    /// Registers `callback` for events of `event_type` (`"*"` for all).
    pub fn subscribe<F>(&self, event_type: impl Into<EventType>, callback: F) -> Subscription
    where
        F: Fn(&KiroEvent) + Send + Sync + 'static,
    {
        self.shared.router.subscribe(event_type, callback)
    }

    /// Like [`subscribe`](Self::subscribe), delivering into a channel.
    pub fn events(
        &self,
        event_type: impl Into<EventType>,
    ) -> (Subscription, mpsc::UnboundedReceiver<KiroEvent>) {
        self.shared.router.subscribe_channel(event_type)
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.shared.router.unsubscribe(subscription);
    }

    pub fn router(&self) -> &EventRouter {
        &self.shared.router
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn state(&self) -> SocketState {
        *self.shared.state_tx.borrow()
    }

    /// Watch receiver that observes every state transition.
    pub fn state_changes(&self) -> watch::Receiver<SocketState> {
        self.shared.state_tx.subscribe()
    }

    /// Reconnect attempts made since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.reconnect_attempts.load(Ordering::SeqCst)
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }
}

async fn supervise(
    shared: Arc<Shared>,
    generation: u64,
    first_tx: oneshot::Sender<Result<()>>,
) {
    let mut first = Some(first_tx);
    let mut timer = ReconnectTimer::new(shared.policy.clone());

    loop {
        if !shared.is_current(generation) {
            return;
        }
        shared.publish(generation, SocketState::Connecting);
        tracing::info!("Connecting to Kiro WebSocket: {}", shared.url);

        match WebSocketFactory::create(&shared.url).await {
            Ok(stream) => {
                if !shared.is_current(generation) {
                    tracing::debug!("Discarding socket opened after disconnect");
                    return;
                }

                timer.reset();
                shared.reconnect_attempts.store(0, Ordering::SeqCst);

                let (write_half, read_half) = stream.split();
                let (tx, rx) = mpsc::channel(WRITE_QUEUE_SIZE);
                tokio::spawn(write_loop(write_half, rx));
                *shared.writer() = Some(tx);

                shared.publish(generation, SocketState::Connected);
                tracing::info!("WebSocket connected to Kiro server");
                if let Some(first) = first.take() {
                    let _ = first.send(Ok(()));
                }
                shared.router.dispatch(&KiroEvent::connected());

                read_loop(&shared, read_half).await;

                if shared.is_current(generation) {
                    shared.writer().take();
                }
            }
            Err(e) => {
                tracing::error!("WebSocket connection failed: {}", e);
                if let Some(first) = first.take() {
                    let _ = first.send(Err(e));
                }
            }
        }

        if !shared.should_reconnect.load(Ordering::SeqCst) || !shared.is_current(generation) {
            tracing::info!("WebSocket closed, not reconnecting");
            return;
        }

        let Some(delay) = timer.next_delay() else {
            tracing::warn!(
                "Giving up on WebSocket after {} reconnect attempts",
                timer.attempts()
            );
            shared.publish(generation, SocketState::Stopped);
            return;
        };

        let attempt = timer.attempts();
        shared.reconnect_attempts.store(attempt, Ordering::SeqCst);
        tracing::info!(
            "Reconnecting WebSocket in {}ms (attempt {}/{})",
            delay.as_millis(),
            attempt,
            shared.policy.max_attempts
        );
        shared.publish(generation, SocketState::BackingOff { attempt, delay });
        tokio::time::sleep(delay).await;
    }
}

async fn read_loop(shared: &Shared, mut read_half: SplitStream<WsStream>) {
    while let Some(frame) = read_half.next().await {
        match frame {
            Ok(Message::Text(text)) => match KiroEvent::parse_text(text.as_str()) {
                Ok(event) => {
                    tracing::debug!("Received event {} from {}", event.event_type, event.source);
                    shared.router.dispatch(&event);
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to parse WebSocket message: {} - Raw: {}",
                        e,
                        text.as_str()
                    );
                }
            },
            Ok(Message::Close(frame)) => {
                match frame {
                    Some(close) => tracing::warn!(
                        "Server closed connection: code={:?}, reason='{}'",
                        close.code,
                        close.reason
                    ),
                    None => tracing::warn!("Server closed connection without close frame"),
                }
                return;
            }
            Ok(Message::Ping(data)) => {
                tracing::debug!("Received ping ({} bytes)", data.len());
            }
            Ok(Message::Pong(data)) => {
                tracing::debug!("Received pong ({} bytes)", data.len());
            }
            Ok(Message::Binary(data)) => {
                tracing::warn!("Received unexpected binary message ({} bytes)", data.len());
            }
            Ok(Message::Frame(_)) => {
                tracing::debug!("Received raw frame (internal)");
            }
            Err(e) => {
                tracing::error!("WebSocket read error: {}", e);
                return;
            }
        }
    }
    tracing::warn!("WebSocket stream ended");
}

async fn write_loop(mut sink: SplitSink<WsStream, Message>, mut rx: mpsc::Receiver<Message>) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = sink.send(message).await {
            tracing::error!("WebSocket write error: {}", e);
            return;
        }
    }

    if let Err(e) = sink.close().await {
        tracing::debug!("WebSocket close after writer shutdown failed: {}", e);
    }
    tracing::debug!("Write task finished");
}
