use super::{TaskStatus, WorkflowTask, connected_sdk, path_id};
use crate::client::KiroSdk;
use crate::types::constants::endpoints;
use crate::types::{KiroError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// A product plan with its embedded tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub feature_list: Vec<String>,
    #[serde(default)]
    pub priorities: BTreeMap<String, String>,
    #[serde(default)]
    pub timestamps: PlanTimestamps,
    #[serde(default)]
    pub tasks: Vec<WorkflowTask>,
}

impl Plan {
    /// Share of tasks in `deployed`, as a rounded percentage. Zero when the
    /// plan has no tasks.
    pub fn progress(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }
        let deployed = self
            .tasks
            .iter()
            .filter(|task| task.status == TaskStatus::Deployed)
            .count();
        ((deployed * 100) as f64 / self.tasks.len() as f64).round() as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanTimestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

/// Body of a plan creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    pub problem_statement: String,
    pub feature_list: Vec<String>,
    pub priorities: BTreeMap<String, String>,
}

impl NewPlan {
    pub fn new(problem_statement: impl Into<String>) -> Self {
        Self {
            problem_statement: problem_statement.into(),
            ..Self::default()
        }
    }

    pub fn feature(mut self, feature: impl Into<String>) -> Self {
        self.feature_list.push(feature.into());
        self
    }

    pub fn priority(mut self, feature: impl Into<String>, level: impl Into<String>) -> Self {
        self.priorities.insert(feature.into(), level.into());
        self
    }
}

/// Partial plan update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_statement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priorities: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    success: bool,
}

/// Plan CRUD against `/kiro/plans`.
pub struct PlanningService {
    sdk: Weak<KiroSdk>,
}

impl PlanningService {
    pub fn new(sdk: &Arc<KiroSdk>) -> Self {
        Self {
            sdk: Arc::downgrade(sdk),
        }
    }

    async fn sdk(&self) -> Result<Arc<KiroSdk>> {
        connected_sdk(&self.sdk, "Planning").await
    }

    pub async fn list_plans(&self) -> Result<Vec<Plan>> {
        self.sdk().await?.get(endpoints::PLANS).await
    }

    pub async fn get_plan(&self, id: &str) -> Result<Plan> {
        let endpoint = format!("{}/{}", endpoints::PLANS, path_id("plan", id)?);
        self.sdk().await?.get(&endpoint).await
    }

    /// Creates a plan. An empty problem statement is rejected before any
    /// request is made.
    pub async fn create_plan(&self, plan: &NewPlan) -> Result<Plan> {
        if plan.problem_statement.trim().is_empty() {
            return Err(KiroError::validation("problemStatement required"));
        }
        let created: Plan = self.sdk().await?.post(endpoints::PLANS, plan).await?;
        tracing::info!("Created plan {}", created.id);
        Ok(created)
    }

    pub async fn update_plan(&self, id: &str, update: &PlanUpdate) -> Result<Plan> {
        let endpoint = format!("{}/{}", endpoints::PLANS, path_id("plan", id)?);
        self.sdk().await?.put(&endpoint, update).await
    }

    pub async fn delete_plan(&self, id: &str) -> Result<()> {
        let endpoint = format!("{}/{}", endpoints::PLANS, path_id("plan", id)?);
        let ack: Ack = self.sdk().await?.delete(&endpoint).await?;
        if !ack.success {
            tracing::warn!("Server did not acknowledge deletion of plan {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(status: TaskStatus) -> WorkflowTask {
        WorkflowTask {
            id: "t".to_string(),
            title: None,
            status,
            history: Vec::new(),
        }
    }

    #[test]
    fn test_plan_from_server_payload() {
        let plan: Plan = serde_json::from_str(
            r#"{
                "id": "plan-1",
                "problemStatement": "Students struggle with retaining complex concepts.",
                "featureList": ["AI Diagnostic Quiz"],
                "priorities": {"AI Diagnostic": "High"},
                "timestamps": {"created": "2025-01-01T00:00:00.000Z"},
                "tasks": []
            }"#,
        )
        .unwrap();

        assert_eq!(plan.feature_list, vec!["AI Diagnostic Quiz"]);
        assert_eq!(plan.priorities["AI Diagnostic"], "High");
        assert!(plan.timestamps.updated.is_none());
        assert_eq!(plan.progress(), 0);
    }

    #[test]
    fn test_progress_rounds() {
        let mut plan: Plan = serde_json::from_str(r#"{"id": "p"}"#).unwrap();
        plan.tasks = vec![
            task(TaskStatus::Deployed),
            task(TaskStatus::Testing),
            task(TaskStatus::Planned),
        ];
        assert_eq!(plan.progress(), 33);

        plan.tasks[1].status = TaskStatus::Deployed;
        assert_eq!(plan.progress(), 67);
    }

    #[test]
    fn test_new_plan_body() {
        let body = serde_json::to_value(
            NewPlan::new("Retention")
                .feature("Quiz")
                .priority("Quiz", "High"),
        )
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "problemStatement": "Retention",
                "featureList": ["Quiz"],
                "priorities": {"Quiz": "High"}
            })
        );
    }

    #[test]
    fn test_plan_update_skips_unset_fields() {
        let update = PlanUpdate {
            problem_statement: Some("New framing".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            serde_json::json!({"problemStatement": "New framing"})
        );
    }
}
