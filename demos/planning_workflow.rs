use kiro_sdk_rs::services::{NewPlan, NewTask, TaskMoved};
use kiro_sdk_rs::{KiroSdk, PlanningService, WorkflowService};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Creates a plan, walks one task through the pipeline, then cleans up
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let sdk = Arc::new(KiroSdk::from_env()?);
    sdk.connect().await?;
    sdk.register_default_services();

    let _moves = sdk.subscribe("workflow:moved", |event| {
        if let Some(moved) = TaskMoved::from_event(event) {
            println!("  event: task {} is now {}", moved.task_id, moved.status);
        }
    });

    let planning = sdk.service::<PlanningService>("planning")?;
    let workflows = sdk.service::<WorkflowService>("workflows")?;

    let plan = planning
        .create_plan(
            &NewPlan::new("Learners forget concepts between sessions")
                .feature("Spaced repetition")
                .priority("Spaced repetition", "High"),
        )
        .await?;
    println!("Created plan {}", plan.id);

    let tasks = workflows
        .create_workflow(&plan.id, &[NewTask::new("Scheduler"), NewTask::new("Reminders")])
        .await?;

    let mut task = tasks.first().cloned().ok_or("server returned no tasks")?;
    while task.status.next().is_some() {
        task = workflows.advance_task(&task).await?;
        println!("Task {} -> {}", task.id, task.status);
    }

    let plan = planning.get_plan(&plan.id).await?;
    println!("Plan progress: {}%", plan.progress());

    // Give the broadcasts a moment to arrive
    tokio::time::sleep(Duration::from_millis(500)).await;

    planning.delete_plan(&plan.id).await?;
    println!("Deleted plan {}", plan.id);

    sdk.disconnect().await;
    Ok(())
}
