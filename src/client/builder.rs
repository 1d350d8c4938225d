use super::KiroSdk;
use crate::infrastructure::{ReconnectPolicy, RetryPolicy};
use crate::types::constants::{
    DEFAULT_API_URL, DEFAULT_PROJECT_ID, DEFAULT_TIMEOUT, DEFAULT_WS_URL,
};
use crate::types::{KiroError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Environment variables read by [`KiroSdkConfig::from_env`]
pub mod env_vars {
    pub const API_URL: &str = "KIRO_API_URL";
    pub const WS_URL: &str = "KIRO_WS_URL";
    pub const PROJECT_ID: &str = "KIRO_PROJECT_ID";
    pub const TIMEOUT_MS: &str = "KIRO_TIMEOUT_MS";
}

/// Construction-time configuration of a [`KiroSdk`].
///
/// Deserializes from the camelCase shape
/// `{apiUrl, wsUrl, projectId, timeout, retryPolicy, reconnect}`; every field
/// is optional and falls back to the local development server defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KiroSdkConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_project_id")]
    pub project_id: String,
    /// Per-request timeout in milliseconds
    #[serde(rename = "timeout", default = "default_timeout")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_ws_url() -> String {
    DEFAULT_WS_URL.to_string()
}
fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

impl Default for KiroSdkConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            ws_url: default_ws_url(),
            project_id: default_project_id(),
            timeout_ms: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl KiroSdkConfig {
    /// Defaults overridden by `KIRO_API_URL`, `KIRO_WS_URL`,
    /// `KIRO_PROJECT_ID` and `KIRO_TIMEOUT_MS` where set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(api_url) = lookup(env_vars::API_URL) {
            config.api_url = api_url;
        }
        if let Some(ws_url) = lookup(env_vars::WS_URL) {
            config.ws_url = ws_url;
        }
        if let Some(project_id) = lookup(env_vars::PROJECT_ID) {
            config.project_id = project_id;
        }
        if let Some(timeout) = lookup(env_vars::TIMEOUT_MS) {
            config.timeout_ms = timeout.trim().parse().map_err(|_| {
                KiroError::validation(format!(
                    "{} must be a number of milliseconds, got '{}'",
                    env_vars::TIMEOUT_MS,
                    timeout
                ))
            })?;
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks URLs, schemes, project id and timeout.
    pub fn validate(&self) -> Result<()> {
        check_scheme(&self.api_url, &["http", "https"])?;
        check_scheme(&self.ws_url, &["ws", "wss"])?;

        if self.project_id.trim().is_empty() {
            return Err(KiroError::validation("projectId is required"));
        }
        if self.timeout_ms == 0 {
            return Err(KiroError::validation("timeout must be greater than zero"));
        }

        Ok(())
    }
}

fn check_scheme(raw: &str, allowed: &[&str]) -> Result<()> {
    let url = Url::parse(raw)?;
    if !allowed.contains(&url.scheme()) {
        return Err(KiroError::validation(format!(
            "unsupported scheme '{}' in '{}' (expected {})",
            url.scheme(),
            raw,
            allowed.join(" or ")
        )));
    }
    Ok(())
}

/// Builder for KiroSdk that validates configuration
#[derive(Debug, Clone, Default)]
pub struct KiroSdkBuilder {
    config: KiroSdkConfig,
}

impl KiroSdkBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: KiroSdkConfig) -> Self {
        Self { config }
    }

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.config.api_url = api_url.into();
        self
    }

    pub fn ws_url(mut self, ws_url: impl Into<String>) -> Self {
        self.config.ws_url = ws_url.into();
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.config.project_id = project_id.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.config.retry_policy = policy;
        self
    }

    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.config.reconnect = policy;
        self
    }

    /// Validate the configuration and build the SDK.
    ///
    /// Nothing is connected yet; call [`KiroSdk::connect`].
    pub fn build(self) -> Result<KiroSdk> {
        self.config.validate()?;
        Ok(KiroSdk::from_config(self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::BackoffStrategy;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = KiroSdkConfig::default();
        assert_eq!(config.api_url, "http://localhost:3001");
        assert_eq!(config.ws_url, "ws://localhost:3001");
        assert_eq!(config.project_id, "conceptpulse-mvp");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config_surface() {
        let config: KiroSdkConfig = serde_json::from_str(
            r#"{
                "apiUrl": "https://kiro.example.com",
                "wsUrl": "wss://kiro.example.com",
                "projectId": "demo",
                "timeout": 2500,
                "retryPolicy": {"maxAttempts": 2, "backoffStrategy": "linear", "initialDelay": 50, "maxDelay": 500}
            }"#,
        )
        .unwrap();

        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(
            config.retry_policy,
            RetryPolicy::new(2, BackoffStrategy::Linear, 50, 500)
        );
        assert_eq!(config.reconnect, ReconnectPolicy::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("KIRO_API_URL", "http://10.0.0.2:4000"),
            ("KIRO_TIMEOUT_MS", "1500"),
        ]);
        let config =
            KiroSdkConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api_url, "http://10.0.0.2:4000");
        assert_eq!(config.ws_url, "ws://localhost:3001");
        assert_eq!(config.timeout_ms, 1500);
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let err = KiroSdkConfig::from_lookup(|key| {
            (key == "KIRO_TIMEOUT_MS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, KiroError::Validation { .. }));
    }

    #[test]
    fn test_validate_rejects_wrong_schemes() {
        let config = KiroSdkConfig {
            ws_url: "http://localhost:3001".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(KiroError::Validation { .. })
        ));

        let config = KiroSdkConfig {
            api_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KiroError::UrlParse(_))));
    }

    #[test]
    fn test_builder_rejects_empty_project() {
        let result = KiroSdkBuilder::new().project_id("  ").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_sets_fields() {
        let builder = KiroSdkBuilder::new()
            .api_url("http://127.0.0.1:9000")
            .ws_url("ws://127.0.0.1:9000")
            .timeout(Duration::from_millis(750))
            .reconnect_policy(ReconnectPolicy::new(2, 10));

        assert_eq!(builder.config.api_url, "http://127.0.0.1:9000");
        assert_eq!(builder.config.timeout_ms, 750);
        assert_eq!(builder.config.reconnect.max_attempts, 2);
    }
}
