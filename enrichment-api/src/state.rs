use std::sync::Arc;

use enrichment_orchestrator::{BatchEnrichmentOrchestrator, PersistenceStore};
use health::HealthRegistry;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: BatchEnrichmentOrchestrator,
    pub persistence: Arc<dyn PersistenceStore>,
    pub health: HealthRegistry,
}
