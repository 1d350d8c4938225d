use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Error categories reported to callers.
///
/// Every [`KiroError`] maps onto exactly one category via [`KiroError::kind`];
/// the UI layer renders fallback states from this rather than from the
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KiroErrorType {
    ConnectionError,
    AuthenticationError,
    ServiceUnavailable,
    ApiError,
    ValidationError,
    TimeoutError,
    RateLimitError,
    PermissionError,
}

impl KiroErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::AuthenticationError => "AUTHENTICATION_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::ApiError => "API_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::RateLimitError => "RATE_LIMIT_ERROR",
            Self::PermissionError => "PERMISSION_ERROR",
        }
    }
}

impl std::fmt::Display for KiroErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when using the Kiro SDK.
#[derive(Error, Debug)]
pub enum KiroError {
    /// WebSocket protocol error (handshake failed, invalid frame, etc.)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// Transport-level HTTP failure (DNS, refused connection, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// General connection error with descriptive message
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server rejected our credentials (401)
    #[error("Authentication error ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// Authenticated but not allowed (403)
    #[error("Permission denied ({status}): {message}")]
    Permission { status: u16, message: String },

    /// Invalid request or configuration
    #[error("Validation error: {message}")]
    Validation {
        status: Option<u16>,
        message: String,
    },

    /// Upstream unavailable (502/503/504)
    #[error("Service unavailable ({status}): {message}")]
    ServiceUnavailable { status: u16, message: String },

    /// Too many requests (429)
    #[error("Rate limited ({status}): {message}")]
    RateLimited { status: u16, message: String },

    /// Any other non-success response
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        retryable: bool,
    },

    /// Request did not complete within the configured timeout
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Request was aborted because the connection manager disconnected
    #[error("Request cancelled")]
    Cancelled,

    /// Attempted operation while not connected to the server
    #[error("Not connected")]
    NotConnected,

    /// SDK method that requires `connect()` was called first
    #[error("Kiro SDK not initialized. Call connect() first.")]
    NotInitialized,

    /// No service registered under the requested name
    #[error("Service '{0}' not found. Make sure it's registered.")]
    ServiceNotFound(String),

    /// A service exists under the name but has a different type
    #[error("Service '{0}' is registered with a different type")]
    ServiceTypeMismatch(String),
}

impl KiroError {
    /// Builds a typed error from a non-success HTTP response.
    ///
    /// `body` is the raw response body; a JSON `{"error": ...}` or
    /// `{"message": ...}` object supplies the message when present.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(status, body);
        let code = status.as_u16();

        match code {
            400 | 422 => Self::Validation {
                status: Some(code),
                message,
            },
            401 => Self::Authentication {
                status: code,
                message,
            },
            403 => Self::Permission {
                status: code,
                message,
            },
            408 => Self::Api {
                status: code,
                message,
                retryable: true,
            },
            429 => Self::RateLimited {
                status: code,
                message,
            },
            502..=504 => Self::ServiceUnavailable {
                status: code,
                message,
            },
            _ => Self::Api {
                status: code,
                message,
                retryable: status.is_server_error(),
            },
        }
    }

    /// Shorthand for configuration/argument validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            status: None,
            message: message.into(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> KiroErrorType {
        match self {
            Self::WebSocket(_)
            | Self::Connection(_)
            | Self::Cancelled
            | Self::NotConnected
            | Self::NotInitialized => KiroErrorType::ConnectionError,
            Self::Http(e) if e.is_timeout() => KiroErrorType::TimeoutError,
            Self::Http(e) if e.is_decode() => KiroErrorType::ApiError,
            Self::Http(_) => KiroErrorType::ConnectionError,
            Self::Serialization(_) | Self::UrlParse(_) | Self::Validation { .. } => {
                KiroErrorType::ValidationError
            }
            Self::Authentication { .. } => KiroErrorType::AuthenticationError,
            Self::Permission { .. } => KiroErrorType::PermissionError,
            Self::ServiceUnavailable { .. }
            | Self::ServiceNotFound(_)
            | Self::ServiceTypeMismatch(_) => KiroErrorType::ServiceUnavailable,
            Self::RateLimited { .. } => KiroErrorType::RateLimitError,
            Self::Api { status: 408, .. } | Self::Timeout { .. } => KiroErrorType::TimeoutError,
            Self::Api { .. } => KiroErrorType::ApiError,
        }
    }

    /// Whether the request that produced this error may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::WebSocket(_)
            | Self::Connection(_)
            | Self::Timeout { .. }
            | Self::ServiceUnavailable { .. }
            | Self::RateLimited { .. } => true,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Api { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// HTTP status associated with this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::Permission { status, .. }
            | Self::ServiceUnavailable { status, .. }
            | Self::RateLimited { status, .. }
            | Self::Api { status, .. } => Some(*status),
            Self::Validation { status, .. } => *status,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(msg) = value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
    {
        return msg.to_string();
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string()
}

/// Convenience type alias for `Result<T, KiroError>`.
pub type Result<T> = std::result::Result<T, KiroError>;
