//! Account listings of both ledgers, used to build mappings.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;
use fidi_core::errors::SyncError;
use fidi_core::ledgers::{SourceAccount, TargetAccount};
use fidi_core::sync::SOURCE_USER_ID_KEY;

pub(crate) fn connected_user_id(state: &AppState) -> ApiResult<String> {
    state
        .sync_state_repository
        .get_value(SOURCE_USER_ID_KEY)?
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::from(SyncError::NotConnected))
}

async fn list_source_accounts(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SourceAccount>>> {
    let user_id = connected_user_id(&state)?;
    let accounts = state.source_ledger.list_accounts(&user_id).await?;
    debug!("[Accounts] {} source accounts for user {}", accounts.len(), user_id);
    Ok(Json(accounts))
}

async fn list_target_accounts(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TargetAccount>>> {
    let accounts = state.target_ledger.list_asset_accounts().await?;
    debug!("[Accounts] {} target asset accounts", accounts.len());
    Ok(Json(accounts))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts/source", get(list_source_accounts))
        .route("/accounts/target", get(list_target_accounts))
}
