use crate::types::constants::{event_sources, event_types};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type-safe event types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    /// Matches every event (subscription-only)
    Wildcard,

    /// Synthetic event dispatched when the socket opens
    Connected,

    /// Greeting the server sends to every new client
    Welcome,

    PlanCreated,
    PlanUpdated,
    PlanDeleted,
    WorkflowMoved,
    PrototypeModeChanged,

    /// Any other server-defined event
    Custom(String),
}

impl EventType {
    /// Parse a string into an EventType
    pub fn parse(s: &str) -> Self {
        match s {
            event_types::WILDCARD => Self::Wildcard,
            event_types::CONNECTED => Self::Connected,
            event_types::WELCOME => Self::Welcome,
            event_types::PLAN_CREATED => Self::PlanCreated,
            event_types::PLAN_UPDATED => Self::PlanUpdated,
            event_types::PLAN_DELETED => Self::PlanDeleted,
            event_types::WORKFLOW_MOVED => Self::WorkflowMoved,
            event_types::PROTOTYPE_MODE_CHANGED => Self::PrototypeModeChanged,
            _ => Self::Custom(s.to_string()),
        }
    }

    /// Convert event type to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard => event_types::WILDCARD,
            Self::Connected => event_types::CONNECTED,
            Self::Welcome => event_types::WELCOME,
            Self::PlanCreated => event_types::PLAN_CREATED,
            Self::PlanUpdated => event_types::PLAN_UPDATED,
            Self::PlanDeleted => event_types::PLAN_DELETED,
            Self::WorkflowMoved => event_types::WORKFLOW_MOVED,
            Self::PrototypeModeChanged => event_types::PROTOTYPE_MODE_CHANGED,
            Self::Custom(s) => s,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == event_types::WILDCARD
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<EventType> for String {
    fn from(event: EventType) -> Self {
        event.as_str().to_string()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized shape of every event delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KiroEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub source: String,
    pub timestamp: String,
    pub data: Value,
}

impl KiroEvent {
    /// Synthetic event emitted when the WebSocket opens.
    pub fn connected() -> Self {
        Self {
            id: generated_id(),
            event_type: EventType::Connected,
            source: event_sources::WEBSOCKET.to_string(),
            timestamp: now_rfc3339(),
            data: serde_json::json!({ "status": "connected" }),
        }
    }

    /// Coerces a raw inbound frame into a `KiroEvent`.
    ///
    /// Every field is optional on the wire; missing or mistyped fields fall
    /// back to a generated id, `unknown` type, the current time, and the whole
    /// frame as `data`.
    pub fn from_frame(frame: Value) -> Self {
        let id = frame
            .get("id")
            .and_then(scalar_to_string)
            .unwrap_or_else(generated_id);
        let event_type = frame
            .get("type")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(EventType::parse)
            .unwrap_or_else(|| EventType::Custom(event_types::UNKNOWN.to_string()));
        let timestamp = frame
            .get("timestamp")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(now_rfc3339);
        let data = match frame.get("data") {
            Some(data) if !data.is_null() => data.clone(),
            _ => frame,
        };

        Self {
            id,
            event_type,
            source: event_sources::SERVER.to_string(),
            timestamp,
            data,
        }
    }

    /// Parses WebSocket text into an event. Fails only on invalid JSON.
    pub fn parse_text(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Value>(text).map(Self::from_frame)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn generated_id() -> String {
    format!("ws-{}", Utc::now().timestamp_millis())
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
