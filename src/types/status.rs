use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_SERVICE_VERSION;

/// Snapshot of the HTTP connection as seen by the last connect or health check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_connected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    pub available_services: Vec<String>,
    pub errors: Vec<ConnectionError>,
}

impl ConnectionStatus {
    pub(crate) fn connected(services: Vec<String>, latency_ms: u64) -> Self {
        Self {
            connected: true,
            last_connected_at: Some(Utc::now()),
            latency_ms: Some(latency_ms),
            available_services: services,
            errors: Vec::new(),
        }
    }

    pub(crate) fn failed(error: ConnectionError) -> Self {
        Self {
            errors: vec![error],
            ..Self::default()
        }
    }
}

/// A failure recorded in [`ConnectionStatus::errors`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionError {
    pub code: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub retryable: bool,
}

impl ConnectionError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Utc::now(),
            retryable,
        }
    }
}

/// Body of `GET /kiro/health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAvailability {
    Available,
    Degraded,
    Unavailable,
}

/// Description of a server-side service advertised by the health check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub status: ServiceAvailability,
    pub endpoints: Vec<String>,
    pub capabilities: Vec<String>,
}

impl ServiceInfo {
    /// Entry for a service the server lists as available.
    ///
    /// The server only reports names, so version/endpoints/capabilities are
    /// placeholders.
    pub fn available(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: DEFAULT_SERVICE_VERSION.to_string(),
            status: ServiceAvailability::Available,
            endpoints: Vec::new(),
            capabilities: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_tolerates_missing_fields() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"server":"running","services":["planning"]}"#).unwrap();
        assert_eq!(health.server, "running");
        assert_eq!(health.database, "");
        assert_eq!(health.services, vec!["planning".to_string()]);
        assert!(health.uptime.is_none());
    }

    #[test]
    fn test_failed_status_records_single_error() {
        let status = ConnectionStatus::failed(ConnectionError::new("CONNECTION_FAILED", "boom", true));
        assert!(!status.connected);
        assert!(status.available_services.is_empty());
        assert_eq!(status.errors.len(), 1);
        assert!(status.errors[0].retryable);
    }

    #[test]
    fn test_connection_status_serializes_camel_case() {
        let status = ConnectionStatus::connected(vec!["docs".to_string()], 12);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["connected"], true);
        assert_eq!(json["latencyMs"], 12);
        assert_eq!(json["availableServices"][0], "docs");
        assert!(json.get("lastConnectedAt").is_some());
    }
}
