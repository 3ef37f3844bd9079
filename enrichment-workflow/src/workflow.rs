use std::sync::Arc;
use std::time::Duration;

use enrichment_common::{LookupParams, PhoneResult};
use enrichment_providers::ProviderRegistry;
use tracing::warn;

use crate::engine::{StepFuture, WorkflowEngine, WorkflowStepSpec};

/// Task queue bounding worker concurrency for Orion Connect specifically:
/// it is the lowest-latency, highest-priority provider and gets its own
/// queue so a burst of Astra/Nimbus traffic can't starve it.
pub const TASK_QUEUE_ORION: &str = "phone-verify-1";
/// Shared queue for the remaining (secondary) providers.
pub const TASK_QUEUE_SECONDARY: &str = "phone-verify-2";
/// Queue a durable-workflow deployment would route email-verification
/// activities through. The in-process engine dispatches email
/// verification inline rather than through a worker queue, but callers
/// that log or trace the dispatch still record this name so the two
/// deployments stay comparable.
pub const TASK_QUEUE_EMAIL_VERIFICATION: &str = "email-verification-queue";

const STEP_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives the priority-ordered waterfall over `registry`'s providers,
/// dispatching each attempt as one workflow step. Re-entrant and
/// idempotent per `workflow_id` by construction — it holds no mutable
/// state of its own between calls, and each step's `workflow_id` is
/// deterministic in its inputs.
pub struct PhoneLookupWorkflow {
    registry: Arc<ProviderRegistry>,
    engine: Arc<dyn WorkflowEngine>,
}

impl PhoneLookupWorkflow {
    pub fn new(registry: Arc<ProviderRegistry>, engine: Arc<dyn WorkflowEngine>) -> Self {
        Self { registry, engine }
    }

    /// Run the waterfall for one lead within one job, returning the first
    /// successful `PhoneResult` or the terminal "no result" outcome once
    /// every provider has been tried.
    pub async fn run(&self, lead_id: i64, job_id: &str, params: &LookupParams) -> PhoneResult {
        for provider in self.registry.ordered() {
            let config = provider.config();
            let task_queue = if config.name == "Orion Connect" {
                TASK_QUEUE_ORION
            } else {
                TASK_QUEUE_SECONDARY
            };
            let spec = WorkflowStepSpec {
                workflow_id: format!("phone-lookup:{job_id}:{lead_id}:{}", config.name),
                task_queue,
                start_to_close_timeout: STEP_TIMEOUT,
            };

            let provider = provider.clone();
            let params = params.clone();
            let activity: StepFuture = Box::pin(async move { provider.execute(&params).await });

            match self.engine.run_step(spec, activity).await {
                Ok(result) if result.is_success() => return result,
                Ok(_) => continue,
                Err(error) => {
                    // A provider-step failure (e.g. a workflow-step timeout) is not
                    // terminal for the workflow — record it and fall through.
                    warn!(provider = %config.name, %error, "provider step failed, trying next");
                    continue;
                }
            }
        }

        PhoneResult::none()
    }
}
