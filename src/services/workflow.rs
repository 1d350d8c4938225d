use super::{connected_sdk, path_id};
use crate::client::KiroSdk;
use crate::messaging::{EventType, KiroEvent};
use crate::types::constants::endpoints;
use crate::types::{KiroError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Weak};

/// Pipeline stage of a task: planned → building → testing → deployed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Planned,
    Building,
    Testing,
    Deployed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Building => "building",
            Self::Testing => "testing",
            Self::Deployed => "deployed",
        }
    }

    /// The following stage, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Planned => Some(Self::Building),
            Self::Building => Some(Self::Testing),
            Self::Testing => Some(Self::Deployed),
            Self::Deployed => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = KiroError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "planned" => Ok(Self::Planned),
            "building" => Ok(Self::Building),
            "testing" => Ok(Self::Testing),
            "deployed" => Ok(Self::Deployed),
            other => Err(KiroError::validation(format!("Invalid status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTask {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub history: Vec<StatusTransition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    #[serde(default)]
    pub from: Option<TaskStatus>,
    pub to: TaskStatus,
    pub timestamp: String,
}

/// Task submitted when creating a workflow; the server assigns missing ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
        }
    }
}

/// Payload of a `workflow:moved` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMoved {
    pub task_id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub history: Vec<StatusTransition>,
}

impl TaskMoved {
    /// Decodes the event payload, or `None` for other event types or
    /// malformed data.
    pub fn from_event(event: &KiroEvent) -> Option<Self> {
        if event.event_type != EventType::WorkflowMoved {
            return None;
        }
        serde_json::from_value(event.data.clone()).ok()
    }
}

#[derive(Deserialize)]
struct Created {
    #[serde(default)]
    tasks: Vec<WorkflowTask>,
}

#[derive(Deserialize)]
struct Moved {
    task: WorkflowTask,
}

/// Task pipeline operations against `/kiro/workflows`.
pub struct WorkflowService {
    sdk: Weak<KiroSdk>,
}

impl WorkflowService {
    pub fn new(sdk: &Arc<KiroSdk>) -> Self {
        Self {
            sdk: Arc::downgrade(sdk),
        }
    }

    async fn sdk(&self) -> Result<Arc<KiroSdk>> {
        connected_sdk(&self.sdk, "Workflow").await
    }

    /// Replaces the plan's tasks with `tasks`, all starting as planned.
    pub async fn create_workflow(&self, plan_id: &str, tasks: &[NewTask]) -> Result<Vec<WorkflowTask>> {
        let plan_id = path_id("plan", plan_id)?;
        let body = json!({ "planId": plan_id, "tasks": tasks });
        let created: Created = self.sdk().await?.post(endpoints::WORKFLOWS, &body).await?;
        tracing::info!("Created workflow with {} task(s) for plan {}", created.tasks.len(), plan_id);
        Ok(created.tasks)
    }

    pub async fn tasks(&self, plan_id: &str) -> Result<Vec<WorkflowTask>> {
        let endpoint = format!("{}/{}", endpoints::WORKFLOWS, path_id("plan", plan_id)?);
        self.sdk().await?.get(&endpoint).await
    }

    pub async fn move_task(&self, task_id: &str, status: TaskStatus) -> Result<WorkflowTask> {
        let endpoint = format!("{}/{}/move", endpoints::WORKFLOWS, path_id("task", task_id)?);
        let moved: Moved = self
            .sdk()
            .await?
            .put(&endpoint, &json!({ "status": status }))
            .await?;
        tracing::debug!("Moved task {} to {}", task_id, status);
        Ok(moved.task)
    }

    /// Moves the task one stage forward; a deployed task is returned as is.
    pub async fn advance_task(&self, task: &WorkflowTask) -> Result<WorkflowTask> {
        match task.status.next() {
            Some(next) => self.move_task(&task.id, next).await,
            None => Ok(task.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_pipeline() {
        assert_eq!(TaskStatus::Planned.next(), Some(TaskStatus::Building));
        assert_eq!(TaskStatus::Testing.next(), Some(TaskStatus::Deployed));
        assert_eq!(TaskStatus::Deployed.next(), None);
        assert_eq!("testing".parse::<TaskStatus>().unwrap(), TaskStatus::Testing);
        assert!("shipped".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_from_server_payload() {
        let task: WorkflowTask = serde_json::from_str(
            r#"{
                "id": "t1",
                "title": "Quiz engine",
                "status": "building",
                "history": [{"from": "planned", "to": "building", "timestamp": "2025-01-01T00:00:00Z"}]
            }"#,
        )
        .unwrap();

        assert_eq!(task.status, TaskStatus::Building);
        assert_eq!(task.history[0].from, Some(TaskStatus::Planned));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = serde_json::from_str::<WorkflowTask>(r#"{"id": "t1", "status": "shipped"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_task_moved_from_event() {
        let event = KiroEvent::from_frame(serde_json::json!({
            "type": "workflow:moved",
            "data": {"taskId": "t1", "planId": "plan-1", "status": "testing", "history": []}
        }));
        let moved = TaskMoved::from_event(&event).unwrap();
        assert_eq!(moved.task_id, "t1");
        assert_eq!(moved.status, TaskStatus::Testing);

        let other = KiroEvent::from_frame(serde_json::json!({"type": "plan:created", "data": {}}));
        assert!(TaskMoved::from_event(&other).is_none());
    }
}
