use std::collections::HashSet;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use enrichment_common::Operation;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TriggerEnrichmentRequest {
    pub lead_ids: Vec<i64>,
    pub operations: HashSet<Operation>,
}

#[derive(Debug, Serialize)]
pub struct TriggerEnrichmentResponse {
    pub job_id: String,
}

/// Looks up the requested leads, enqueues the batch, and returns the job id
/// synchronously. Leads that can't be found are silently dropped from the
/// batch rather than failing the whole request.
pub async fn trigger_enrichment(
    State(state): State<AppState>,
    Json(request): Json<TriggerEnrichmentRequest>,
) -> impl IntoResponse {
    let leads = state.persistence.find_many_by_ids(&request.lead_ids).await;
    let job_id = state
        .orchestrator
        .enqueue_enrichment_job(leads, request.operations)
        .await;

    (StatusCode::ACCEPTED, Json(TriggerEnrichmentResponse { job_id }))
}

pub async fn get_job(State(state): State<AppState>, Path(job_id): Path<String>) -> impl IntoResponse {
    match state.orchestrator.tracker().get_job(&job_id).await {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Upgrades to a WebSocket and streams `ProgressBus` events for `job_id` as
/// JSON text frames. Closes once the socket errors or the subscriber lags
/// past the room's buffer.
pub async fn progress_ws(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| stream_progress(socket, state, job_id))
}

async fn stream_progress(mut socket: WebSocket, state: AppState, job_id: String) {
    let mut receiver = state.orchestrator.progress().subscribe(&job_id).await;

    loop {
        let event = match receiver.recv().await {
            Ok(event) => event,
            Err(error) => {
                warn!(job_id, %error, "progress subscriber disconnected");
                break;
            }
        };

        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(error) => {
                warn!(job_id, %error, "failed to serialize progress event");
                continue;
            }
        };

        if socket.send(Message::Text(text)).await.is_err() {
            break;
        }
    }

    let _ = socket.close().await;
}
