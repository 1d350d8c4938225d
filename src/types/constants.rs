/// Event type strings (magic strings layer)
pub mod event_types {
    pub const WILDCARD: &str = "*";
    pub const CONNECTED: &str = "kiro:connected";
    pub const WELCOME: &str = "welcome";
    pub const PLAN_CREATED: &str = "plan:created";
    pub const PLAN_UPDATED: &str = "plan:updated";
    pub const PLAN_DELETED: &str = "plan:deleted";
    pub const WORKFLOW_MOVED: &str = "workflow:moved";
    pub const PROTOTYPE_MODE_CHANGED: &str = "prototype:mode_changed";
    pub const UNKNOWN: &str = "unknown";
}

/// Event sources
pub mod event_sources {
    pub const WEBSOCKET: &str = "websocket";
    pub const SERVER: &str = "kiro-server";
}

/// REST endpoints exposed by the Kiro server
pub mod endpoints {
    pub const HEALTH: &str = "/kiro/health";
    pub const PLANS: &str = "/kiro/plans";
    pub const WORKFLOWS: &str = "/kiro/workflows";
    pub const PROTOTYPE_SESSION: &str = "/kiro/prototype/session";
    pub const PROTOTYPE_STATUS: &str = "/kiro/prototype/status";
    pub const DOCS_ARCHITECTURE: &str = "/kiro/docs/architecture";
    pub const DOCS_APIS: &str = "/kiro/docs/apis";
    pub const DOCS_STACK: &str = "/kiro/docs/stack";
    pub const EXECUTION_STATUS: &str = "/kiro/execution/status";
}

/// Names under which the built-in services are registered
pub mod service_names {
    pub const PLANNING: &str = "planning";
    pub const PROTOTYPING: &str = "prototyping";
    pub const DOCUMENTATION: &str = "documentation";
    pub const WORKFLOWS: &str = "workflows";
    pub const EXECUTION: &str = "execution";
}

/// Error code recorded when the health-check connect fails
pub const CONNECTION_FAILED: &str = "CONNECTION_FAILED";

/// Default endpoints (local Kiro server)
pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_WS_URL: &str = "ws://localhost:3001";
pub const DEFAULT_PROJECT_ID: &str = "conceptpulse-mvp";

/// Default request timeout (milliseconds)
pub const DEFAULT_TIMEOUT: u64 = 10000;

/// Default retry policy
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_INITIAL_DELAY: u64 = 1000;
pub const DEFAULT_RETRY_MAX_DELAY: u64 = 10000;

/// Default WebSocket reconnect policy
pub const DEFAULT_RECONNECT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_DELAY: u64 = 1000;

/// Capacity of the outbound WebSocket queue between `send` and the write task
pub const WRITE_QUEUE_SIZE: usize = 100;

/// Version reported for services until the server exposes one
pub const DEFAULT_SERVICE_VERSION: &str = "1.0.0";
