use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use fidi_connect::ConnectError;
use fidi_core::errors::{DatabaseError, Error as CoreError, LedgerError, SyncError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A ledger answered with an error or could not be reached.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("[Api] {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ApiError::BadRequest(msg),
            CoreError::Sync(err) => err.into(),
            CoreError::Ledger(err) => err.into(),
            CoreError::Database(DatabaseError::NotFound(msg)) => ApiError::NotFound(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::AlreadyRunning | SyncError::NotConnected | SyncError::NothingMapped => {
                ApiError::Conflict(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Auth(msg) => {
                ApiError::Upstream(format!("ledger authentication failed: {}", msg))
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ConnectError> for ApiError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::InvalidRequest(msg) => ApiError::BadRequest(msg),
            other => LedgerError::from(other).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preconditions_are_conflicts() {
        let err = ApiError::from(CoreError::from(SyncError::NotConnected));
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err = ApiError::from(CoreError::from(SyncError::AlreadyRunning));
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_is_bad_request() {
        let err = ApiError::from(CoreError::Validation("empty target".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "empty target");
    }

    #[test]
    fn ledger_failures_are_bad_gateway() {
        let err = ApiError::from(ConnectError::api(503, "maintenance"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);

        let err = ApiError::from(LedgerError::Auth("invalid token".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("ledger authentication failed"));

        let err = ApiError::from(ConnectError::invalid_request("email or mobile is required"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
