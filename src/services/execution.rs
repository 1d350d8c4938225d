use super::connected_sdk;
use crate::client::KiroSdk;
use crate::types::constants::endpoints;
use crate::types::{HealthStatus, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub health: HealthStatus,
}

impl ExecutionStatus {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }
}

pub struct ExecutionService {
    sdk: Weak<KiroSdk>,
}

impl ExecutionService {
    pub fn new(sdk: &Arc<KiroSdk>) -> Self {
        Self {
            sdk: Arc::downgrade(sdk),
        }
    }

    pub async fn status(&self) -> Result<ExecutionStatus> {
        connected_sdk(&self.sdk, "Execution")
            .await?
            .get(endpoints::EXECUTION_STATUS)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_status_payload() {
        let status: ExecutionStatus = serde_json::from_str(
            r#"{"status": "running", "health": {"server": "running", "database": "connected", "services": ["planning"]}}"#,
        )
        .unwrap();
        assert!(status.is_running());
        assert_eq!(status.health.services, vec!["planning"]);
    }
}
