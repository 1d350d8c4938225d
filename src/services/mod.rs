//! Typed clients for the Kiro server's REST services.
//!
//! Each service holds a weak handle to its [`KiroSdk`] and refuses to issue
//! requests unless the SDK is connected.

mod documentation;
mod execution;
mod planning;
mod prototype;
mod workflow;

pub use documentation::{DocumentKind, DocumentPage, DocumentationService, ProjectDocs};
pub use execution::{ExecutionService, ExecutionStatus};
pub use planning::{NewPlan, Plan, PlanTimestamps, PlanUpdate, PlanningService};
pub use prototype::{PrototypeService, PrototypeSession};
pub use workflow::{
    NewTask, StatusTransition, TaskMoved, TaskStatus, WorkflowService, WorkflowTask,
};

use crate::client::KiroSdk;
use crate::types::{KiroError, Result};
use std::sync::{Arc, Weak};

/// Upgrades the service's SDK handle, failing unless it is connected.
async fn connected_sdk(sdk: &Weak<KiroSdk>, service: &str) -> Result<Arc<KiroSdk>> {
    let sdk = sdk.upgrade().ok_or(KiroError::NotInitialized)?;
    if !sdk.is_connected().await {
        tracing::warn!("{} service used while the SDK is not connected", service);
        return Err(KiroError::NotConnected);
    }
    Ok(sdk)
}

/// Rejects identifiers that would change the request path.
fn path_id<'a>(kind: &str, id: &'a str) -> Result<&'a str> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(KiroError::validation(format!("invalid {} id '{}'", kind, id)));
    }
    Ok(id)
}
