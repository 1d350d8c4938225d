use super::connected_sdk;
use crate::client::KiroSdk;
use crate::types::Result;
use crate::types::constants::endpoints;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Weak};

/// Prototype mode session; `session_id` is set only while active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrototypeSession {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub session_id: Option<String>,
}

pub struct PrototypeService {
    sdk: Weak<KiroSdk>,
}

impl PrototypeService {
    pub fn new(sdk: &Arc<KiroSdk>) -> Self {
        Self {
            sdk: Arc::downgrade(sdk),
        }
    }

    /// Turns prototype mode on or off and returns the resulting session.
    pub async fn set_mode(&self, enabled: bool) -> Result<PrototypeSession> {
        let sdk = connected_sdk(&self.sdk, "Prototyping").await?;
        let session: PrototypeSession = sdk
            .post(endpoints::PROTOTYPE_SESSION, &json!({ "prototypeMode": enabled }))
            .await?;
        tracing::info!(
            "Prototype mode {}",
            if session.active { "enabled" } else { "disabled" }
        );
        Ok(session)
    }

    pub async fn status(&self) -> Result<PrototypeSession> {
        connected_sdk(&self.sdk, "Prototyping")
            .await?
            .get(endpoints::PROTOTYPE_STATUS)
            .await
    }
}
