//! # Kiro SDK
//!
//! Client-side connection layer for the Kiro IDE server: a REST pipeline with
//! timeout, retry and cancellation, a real-time event socket with automatic
//! reconnection and typed subscriptions, and a facade tying both together
//! with a registry of typed service clients.
//!
//! ## Example
//!
//! ```no_run
//! use kiro_sdk_rs::{KiroSdk, KiroSdkConfig, PlanningService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sdk = Arc::new(KiroSdk::new(KiroSdkConfig::default())?);
//!     sdk.connect().await?;
//!
//!     let _all = sdk.subscribe("*", |event| {
//!         println!("{} from {}", event.event_type, event.source);
//!     });
//!
//!     sdk.register_default_services();
//!     let planning = sdk.service::<PlanningService>("planning")?;
//!     for plan in planning.list_plans().await? {
//!         println!("{}: {}% deployed", plan.id, plan.progress());
//!     }
//!
//!     sdk.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod connection;
pub mod infrastructure;
pub mod messaging;
pub mod services;
pub mod types;
pub mod websocket;

pub use client::{KiroSdk, KiroSdkBuilder, KiroSdkConfig};
pub use connection::ConnectionManager;
pub use infrastructure::{BackoffStrategy, ReconnectPolicy, RequestOptions, RetryPolicy};
pub use messaging::{EventType, KiroEvent, Subscription};
pub use services::{
    DocumentationService, ExecutionService, PlanningService, PrototypeService, WorkflowService,
};
pub use types::{
    ConnectionError, ConnectionStatus, HealthStatus, KiroError, KiroErrorType, Result,
    ServiceInfo,
};
pub use websocket::{SocketState, WebSocketManager};
