use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use enrichment_common::PhoneResult;
use thiserror::Error;

/// A single step's future, already bound to its arguments. Boxed so that
/// `WorkflowEngine` stays object-safe (`Arc<dyn WorkflowEngine>`).
pub type StepFuture = Pin<Box<dyn Future<Output = PhoneResult> + Send>>;

/// Identifies and bounds one workflow step, mirroring a
/// `startChildWorkflow(name, { workflowId, taskQueue, args })` contract.
#[derive(Debug, Clone)]
pub struct WorkflowStepSpec {
    /// Deterministic in (operation, lead id, job id) so re-delivery by the
    /// workflow engine doesn't double-charge or double-persist.
    pub workflow_id: String,
    pub task_queue: &'static str,
    pub start_to_close_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow step {workflow_id} exceeded its {timeout_ms}ms start-to-close timeout")]
    StepTimeout {
        workflow_id: String,
        timeout_ms: u64,
    },
}

/// Models a durable-workflow engine's contract. The engine's own
/// durability, retry-on-crash, and persistence are deliberately out of
/// scope here — only the step-dispatch/timeout shape is modeled.
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    async fn run_step(
        &self,
        spec: WorkflowStepSpec,
        activity: StepFuture,
    ) -> Result<PhoneResult, WorkflowError>;
}

/// An in-process engine suitable for running the core without an external
/// durable-execution system, and for tests. Applies the step's
/// start-to-close timeout and nothing else — no persistence, no replay.
pub struct InMemoryWorkflowEngine;

impl InMemoryWorkflowEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InMemoryWorkflowEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowEngine for InMemoryWorkflowEngine {
    async fn run_step(
        &self,
        spec: WorkflowStepSpec,
        activity: StepFuture,
    ) -> Result<PhoneResult, WorkflowError> {
        tokio::time::timeout(spec.start_to_close_timeout, activity)
            .await
            .map_err(|_| WorkflowError::StepTimeout {
                workflow_id: spec.workflow_id,
                timeout_ms: spec.start_to_close_timeout.as_millis() as u64,
            })
    }
}
