//! Account mapping management.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiResult;
use crate::main_lib::AppState;
use fidi_core::mappings::{AccountMapping, NewAccountMapping};

/// Bulk form submission. Entries with an empty target stay unmapped.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveMappingsRequest {
    mappings: Vec<NewAccountMapping>,
}

async fn list_mappings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AccountMapping>>> {
    Ok(Json(state.mapping_service.list_mappings()?))
}

async fn save_mappings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SaveMappingsRequest>,
) -> ApiResult<Json<Vec<AccountMapping>>> {
    let submitted = request.mappings.len();
    let saved = state
        .mapping_service
        .upsert_mappings(request.mappings)
        .await?;
    info!("[Mappings] Saved {} of {} submitted mappings", saved.len(), submitted);
    Ok(Json(saved))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/mappings", get(list_mappings).put(save_mappings))
}
