use std::sync::Arc;

use chrono::Duration;
use enrichment_orchestrator::{
    BatchEnrichmentOrchestrator, FixedEmailVerifier, InMemoryPersistenceStore, JobTracker,
    PersistenceStore, ProgressBus,
};
use enrichment_providers::config::{astra_config, nimbus_config, orion_config, NIMBUS_STATIC_API_KEY};
use enrichment_providers::{AstraProvider, NimbusProvider, OrionProvider, ProviderRegistry};
use enrichment_workflow::{InMemoryWorkflowEngine, PhoneLookupWorkflow};
use health::HealthRegistry;

use crate::config::Config;
use crate::state::AppState;

fn liveness_max_age() -> Duration {
    Duration::seconds(120)
}

/// Builds the full dependency graph from process configuration: providers,
/// workflow engine, job tracker, progress bus, persistence, and email
/// verifier, assembled into one orchestrator.
pub async fn build_state(config: &Config) -> AppState {
    let registry = Arc::new(ProviderRegistry::new(vec![
        Arc::new(OrionProvider::new(orion_config(), config.orion_api_key.clone())),
        Arc::new(AstraProvider::new(astra_config(), config.astra_api_key.clone())),
        Arc::new(NimbusProvider::new(nimbus_config(), NIMBUS_STATIC_API_KEY.to_string())),
    ]));

    let workflow = Arc::new(PhoneLookupWorkflow::new(registry, Arc::new(InMemoryWorkflowEngine::new())));

    let health = HealthRegistry::new("enrichment-api");
    let liveness = health
        .register("batch-enrichment-orchestrator".to_string(), liveness_max_age())
        .await;

    let tracker = JobTracker::with_cleanup_delay(config.job_cleanup_delay());
    let progress = ProgressBus::new();
    let persistence = InMemoryPersistenceStore::new(Vec::new());
    let email_verifier = Arc::new(FixedEmailVerifier::new(true));

    let orchestrator = BatchEnrichmentOrchestrator::new(
        persistence.clone(),
        email_verifier,
        workflow,
        tracker,
        progress,
        Some(liveness),
    );

    let persistence: Arc<dyn PersistenceStore> = persistence;

    AppState {
        orchestrator,
        persistence,
        health,
    }
}
