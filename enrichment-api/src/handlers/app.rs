use axum::{routing, Router};

use super::jobs;
use crate::state::AppState;

pub fn add_routes(router: Router<AppState>, state: AppState) -> Router {
    router
        .route("/", routing::get(index))
        .route("/_readiness", routing::get(index))
        .route("/_liveness", routing::get(liveness))
        .route("/jobs/enrichment", routing::post(jobs::trigger_enrichment))
        .route("/jobs/:job_id", routing::get(jobs::get_job))
        .route("/jobs/:job_id/progress", routing::get(jobs::progress_ws))
        .with_state(state)
}

pub async fn index() -> &'static str {
    "enrichment api"
}

async fn liveness(axum::extract::State(state): axum::extract::State<AppState>) -> health::HealthStatus {
    state.health.get_status().await
}
