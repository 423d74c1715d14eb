//! Source-ledger user creation.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;
use fidi_core::sync::SOURCE_USER_ID_KEY;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    mobile: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectResponse {
    user_id: String,
    /// Token for the bank consent UI of the new user.
    client_token: String,
}

/// Creates a Basiq user, stores its id as the connected user and returns a
/// client token to open the consent flow with.
async fn connect_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConnectRequest>,
) -> ApiResult<Json<ConnectResponse>> {
    let user = state
        .basiq_client
        .create_user(request.email.as_deref(), request.mobile.as_deref())
        .await?;

    state
        .sync_state_repository
        .set_value(SOURCE_USER_ID_KEY.to_string(), user.id.clone())
        .await
        .map_err(|e| {
            error!("[Connect] Failed to store user {}: {}", user.id, e);
            ApiError::Internal(format!("failed to save user: {}", e))
        })?;
    info!("[Connect] Connected source ledger user {}", user.id);

    let client_token = state.basiq_client.client_token(&user.id).await?;

    Ok(Json(ConnectResponse {
        user_id: user.id,
        client_token,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/connect", post(connect_user))
}
