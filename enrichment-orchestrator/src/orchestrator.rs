use std::collections::HashSet;
use std::sync::Arc;

use enrichment_common::{JobType, Lead, LookupParams, Operation, TriState};
use enrichment_workflow::{PhoneLookupWorkflow, TASK_QUEUE_EMAIL_VERIFICATION};
use futures::future::join_all;
use health::HealthHandle;
use tracing::{debug, error};

use crate::email::EmailVerifier;
use crate::job_tracker::JobTracker;
use crate::persistence::PersistenceStore;
use crate::progress::{OperationData, Progress, ProgressBus, ProgressEvent};

const EXISTING_PROVIDER: &str = "Existing";

/// Executes all selected operations across all leads in a batch with
/// maximum parallelism, persists results, and emits progress events.
/// Cheap to clone — every field is internally `Arc`-shared.
#[derive(Clone)]
pub struct BatchEnrichmentOrchestrator {
    persistence: Arc<dyn PersistenceStore>,
    email_verifier: Arc<dyn EmailVerifier>,
    workflow: Arc<PhoneLookupWorkflow>,
    tracker: JobTracker,
    progress: ProgressBus,
    liveness: Option<HealthHandle>,
}

impl BatchEnrichmentOrchestrator {
    pub fn new(
        persistence: Arc<dyn PersistenceStore>,
        email_verifier: Arc<dyn EmailVerifier>,
        workflow: Arc<PhoneLookupWorkflow>,
        tracker: JobTracker,
        progress: ProgressBus,
        liveness: Option<HealthHandle>,
    ) -> Self {
        Self {
            persistence,
            email_verifier,
            workflow,
            tracker,
            progress,
            liveness,
        }
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    pub fn progress(&self) -> &ProgressBus {
        &self.progress
    }

    /// Creates the job record and spawns the fan-out in the background,
    /// returning the job id synchronously so callers never block on the
    /// batch itself.
    pub async fn enqueue_enrichment_job(&self, leads: Vec<Lead>, operations: HashSet<Operation>) -> String {
        let job_id = self
            .tracker
            .create_enrichment_job(leads.len() * operations.len(), operations.clone())
            .await;

        let orchestrator = self.clone();
        let dispatch_job_id = job_id.clone();
        tokio::spawn(async move {
            orchestrator.run(dispatch_job_id, leads, operations).await;
        });

        job_id
    }

    /// Runs every (lead × operation) cell to completion, emits the terminal
    /// `job-complete` event, and schedules cleanup. Returns once every cell
    /// has terminated.
    async fn run(&self, job_id: String, leads: Vec<Lead>, operations: HashSet<Operation>) {
        let total = leads.len() * operations.len();

        let cells = leads.into_iter().flat_map(|lead| {
            operations.iter().copied().map(move |operation| (lead.clone(), operation))
        });

        join_all(cells.map(|(lead, operation)| self.run_cell(job_id.clone(), lead, operation, total))).await;

        if let Some(liveness) = &self.liveness {
            liveness.report_healthy().await;
        }

        let total_processed = self
            .tracker
            .get_job(&job_id)
            .await
            .map(|snapshot| snapshot.processed_leads)
            .unwrap_or(0);

        self.progress
            .publish(
                &job_id,
                ProgressEvent::JobComplete {
                    job_id: job_id.clone(),
                    kind: JobType::Enrichment,
                    total_processed,
                },
            )
            .await;

        self.tracker.cleanup(job_id.clone());
        let progress = self.progress.clone();
        let cleanup_delay = self.tracker.cleanup_delay();
        let cleanup_job_id = job_id;
        tokio::spawn(async move {
            // Shares JobTracker's cleanup delay so the room outlives the
            // terminal event long enough for late subscribers to read it.
            tokio::time::sleep(cleanup_delay).await;
            progress.remove_room(&cleanup_job_id).await;
        });
    }

    async fn run_cell(&self, job_id: String, lead: Lead, operation: Operation, total: usize) {
        let lead_id = lead.id;

        let outcome = match operation {
            Operation::VerifyEmail => self.run_email_verification(&job_id, &lead).await,
            Operation::PhoneLookup => self.run_phone_lookup(&job_id, &lead).await,
        };

        let completed = self.tracker.increment_progress(&job_id).await.unwrap_or(total);
        let progress = Progress { completed, total };

        match outcome {
            Ok(data) => {
                self.progress
                    .publish(&job_id, ProgressEvent::OperationComplete { lead_id, data, progress })
                    .await;
            }
            Err(message) => {
                error!(job_id, lead_id, operation = operation.as_str(), %message, "enrichment cell failed");
                self.progress
                    .publish(&job_id, ProgressEvent::OperationError { lead_id, operation, error: message })
                    .await;
            }
        }
    }

    async fn run_email_verification(&self, job_id: &str, lead: &Lead) -> Result<OperationData, String> {
        if lead.email_verified.is_known() {
            let verified = lead
                .email_verified
                .as_bool()
                .expect("is_known() guarantees a resolved bool");
            return Ok(OperationData::VerifyEmail { email_verified: verified });
        }

        let workflow_id = format!("verify-email:{}:{job_id}", lead.id);
        debug!(
            workflow_id,
            task_queue = TASK_QUEUE_EMAIL_VERIFICATION,
            "dispatching email verification"
        );
        let verified = self
            .email_verifier
            .verify(&workflow_id, lead)
            .await
            .map_err(|error| error.to_string())?;

        self.persistence
            .update_fields(lead.id, None, Some(TriState::from(verified)))
            .await
            .map_err(|error| error.to_string())?;

        Ok(OperationData::VerifyEmail { email_verified: verified })
    }

    async fn run_phone_lookup(&self, job_id: &str, lead: &Lead) -> Result<OperationData, String> {
        if let Some(phone) = &lead.phone_number {
            return Ok(OperationData::PhoneLookup {
                phone: Some(phone.clone()),
                provider: EXISTING_PROVIDER.to_string(),
                cost: rust_decimal::Decimal::ZERO,
            });
        }

        let params = LookupParams::from_lead(lead);
        let result = self.workflow.run(lead.id, job_id, &params).await;

        if result.phone.is_some() {
            self.persistence
                .update_fields(lead.id, result.phone.clone(), None)
                .await
                .map_err(|error| error.to_string())?;
        }

        Ok(OperationData::PhoneLookup {
            phone: result.phone,
            provider: result.provider,
            cost: result.cost,
        })
    }
}
