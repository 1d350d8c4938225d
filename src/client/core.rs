use super::{KiroSdkBuilder, KiroSdkConfig, ServiceRegistry};
use crate::connection::ConnectionManager;
use crate::infrastructure::RequestOptions;
use crate::messaging::{EventType, KiroEvent, Subscription};
use crate::services::{
    DocumentationService, ExecutionService, PlanningService, PrototypeService, WorkflowService,
};
use crate::types::constants::service_names;
use crate::types::{ConnectionStatus, HealthStatus, KiroError, Result, ServiceInfo};
use crate::websocket::{SocketState, WebSocketManager};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc, watch};

/// The main entry point for talking to a Kiro server.
///
/// `KiroSdk` composes the HTTP [`ConnectionManager`] and the event
/// [`WebSocketManager`], and keeps a registry of typed service clients.
/// Nothing happens on construction; [`connect()`](Self::connect) performs the
/// health check and opens the event socket.
///
/// # Example
///
/// ```no_run
/// use kiro_sdk_rs::{KiroSdk, KiroSdkConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sdk = KiroSdk::new(KiroSdkConfig::default())?;
/// sdk.connect().await?;
///
/// let health = sdk.health().await?;
/// println!("server is {}", health.server);
///
/// sdk.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct KiroSdk {
    config: KiroSdkConfig,
    connection: ConnectionManager,
    websocket: WebSocketManager,
    services: ServiceRegistry,
    initialized: AtomicBool,
    // Serializes connect/disconnect.
    lifecycle: Mutex<()>,
}

impl KiroSdk {
    /// Validates `config` and creates an unconnected SDK.
    pub fn new(config: KiroSdkConfig) -> Result<Self> {
        KiroSdkBuilder::from_config(config).build()
    }

    pub fn builder() -> KiroSdkBuilder {
        KiroSdkBuilder::new()
    }

    /// [`KiroSdkConfig::from_env`] followed by [`new`](Self::new).
    pub fn from_env() -> Result<Self> {
        Self::new(KiroSdkConfig::from_env()?)
    }

    pub(crate) fn from_config(config: KiroSdkConfig) -> Self {
        let connection = ConnectionManager::new(&config);
        let websocket = WebSocketManager::new(config.ws_url.clone(), config.reconnect.clone());

        Self {
            config,
            connection,
            websocket,
            services: ServiceRegistry::new(),
            initialized: AtomicBool::new(false),
            lifecycle: Mutex::new(()),
        }
    }

    /// Runs the HTTP health check, then opens the event socket.
    ///
    /// Does nothing if already initialized. Either step failing returns its
    /// error and leaves the SDK uninitialized.
    pub async fn connect(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().await;
        if self.is_initialized() {
            return Ok(());
        }

        tracing::info!("Initializing Kiro SDK for project {}", self.config.project_id);
        self.connection.connect().await?;
        self.websocket.connect().await?;

        self.initialized.store(true, Ordering::SeqCst);
        tracing::info!("Kiro SDK initialized");
        Ok(())
    }

    /// Cancels pending requests, closes the socket and clears the service
    /// registry. Does nothing if not initialized.
    pub async fn disconnect(&self) {
        let _lifecycle = self.lifecycle.lock().await;
        if !self.is_initialized() {
            return;
        }

        self.connection.disconnect().await;
        self.websocket.disconnect();
        self.services.clear();

        self.initialized.store(false, Ordering::SeqCst);
        tracing::info!("Kiro SDK disconnected");
    }

    /// Sends a request and decodes the JSON response into `T`.
    ///
    /// An empty body decodes as JSON `null`, so `T = ()` or `Option<_>` work
    /// for endpoints that return nothing.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let response = self.connection.make_request(endpoint, options).await?;
        let bytes = response.bytes().await?;

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        Ok(serde_json::from_slice(body)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, RequestOptions::get()).await
    }

    /// POSTs `body` as JSON. A body that serializes to `null` (such as `&()`)
    /// sends no body at all.
    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, RequestOptions::post(json_body(body)?))
            .await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(endpoint, RequestOptions::put(json_body(body)?))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, RequestOptions::delete()).await
    }

    /// GETs `endpoint` and returns the body as text.
    pub async fn get_text(&self, endpoint: &str) -> Result<String> {
        let response = self
            .connection
            .make_request(endpoint, RequestOptions::get())
            .await?;
        Ok(response.text().await?)
    }

    /// Registers `callback` for `event_type`; `"*"` receives every event.
    pub fn subscribe<F>(&self, event_type: impl Into<EventType>, callback: F) -> Subscription
    where
        F: Fn(&KiroEvent) + Send + Sync + 'static,
    {
        self.websocket.subscribe(event_type, callback)
    }

    /// Channel-based variant of [`subscribe`](Self::subscribe).
    pub fn events(
        &self,
        event_type: impl Into<EventType>,
    ) -> (Subscription, mpsc::UnboundedReceiver<KiroEvent>) {
        self.websocket.events(event_type)
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.websocket.unsubscribe(subscription);
    }

    /// Sends `data` over the event socket; dropped with a warning when the
    /// socket is down.
    pub fn send_message<T: Serialize + ?Sized>(&self, data: &T) -> bool {
        self.websocket.send(data)
    }

    pub fn register_service<T: Any + Send + Sync>(&self, name: impl Into<String>, service: Arc<T>) {
        self.services.register(name, service);
    }

    /// Typed lookup of a registered service.
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.services.get(name)
    }

    pub fn registered_services(&self) -> Vec<String> {
        self.services.names()
    }

    /// Registers the planning, prototyping, documentation, workflow and
    /// execution clients under their conventional names.
    pub fn register_default_services(self: &Arc<Self>) {
        self.register_service(service_names::PLANNING, Arc::new(PlanningService::new(self)));
        self.register_service(
            service_names::PROTOTYPING,
            Arc::new(PrototypeService::new(self)),
        );
        self.register_service(
            service_names::DOCUMENTATION,
            Arc::new(DocumentationService::new(self)),
        );
        self.register_service(service_names::WORKFLOWS, Arc::new(WorkflowService::new(self)));
        self.register_service(service_names::EXECUTION, Arc::new(ExecutionService::new(self)));
    }

    /// Whether `connect()` has completed and `disconnect()` has not run since.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Whether `connect()` completed and the last HTTP health check succeeded.
    pub async fn is_connected(&self) -> bool {
        self.is_initialized() && self.connection.is_connected().await
    }

    pub async fn connection_status(&self) -> ConnectionStatus {
        self.connection.status().await
    }

    /// Fetches server health. Requires a completed `connect()`.
    pub async fn health(&self) -> Result<HealthStatus> {
        if !self.is_initialized() {
            return Err(KiroError::NotInitialized);
        }
        self.connection.check_health().await
    }

    /// Services advertised by the last successful health check.
    pub async fn list_available_services(&self) -> Vec<ServiceInfo> {
        self.connection
            .status()
            .await
            .available_services
            .into_iter()
            .map(ServiceInfo::available)
            .collect()
    }

    pub fn is_websocket_connected(&self) -> bool {
        self.websocket.is_connected()
    }

    pub fn socket_state(&self) -> SocketState {
        self.websocket.state()
    }

    pub fn socket_state_changes(&self) -> watch::Receiver<SocketState> {
        self.websocket.state_changes()
    }

    pub fn config(&self) -> &KiroSdkConfig {
        &self.config
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn websocket(&self) -> &WebSocketManager {
        &self.websocket
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<Option<Value>> {
    match serde_json::to_value(body)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}
