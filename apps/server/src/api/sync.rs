//! Manual trigger and run status.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;
use fidi_core::errors::SyncError;
use fidi_core::sync::TriggerOutcome;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncStatusResponse {
    last_run: Option<String>,
    last_run_status: Option<String>,
    running: bool,
    connected: bool,
}

/// Starts a pass in the background. Answers 409 while one is running.
async fn trigger_sync(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    match state.scheduler.trigger() {
        TriggerOutcome::Accepted => {
            info!("[Sync] Manual pass started");
            Ok(StatusCode::ACCEPTED)
        }
        TriggerOutcome::AlreadyRunning => Err(ApiError::from(SyncError::AlreadyRunning)),
    }
}

async fn get_sync_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncStatusResponse>> {
    let status = state.sync_service.get_run_status()?;
    let connected = state.sync_service.is_connected()?;
    Ok(Json(SyncStatusResponse {
        last_run: status.last_run_timestamp,
        last_run_status: status.last_run_summary,
        running: state.scheduler.is_running(),
        connected,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync", post(trigger_sync))
        .route("/sync/status", get(get_sync_status))
}
