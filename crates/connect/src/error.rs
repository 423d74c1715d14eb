//! Error types for the ledger clients.

use thiserror::Error;

use fidi_core::errors::LedgerError;

/// Result type alias for ledger client operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

#[derive(Debug, Error)]
pub enum ConnectError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success answer from the ledger API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request (missing required data, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Response that could not be used (bad pagination link, missing field)
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing or unusable credentials
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ConnectError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The ledger understood the request and refused the record (duplicate or
    /// failed validation).
    pub fn is_rejection(&self) -> bool {
        self.status_code() == Some(422)
    }
}

impl From<ConnectError> for LedgerError {
    fn from(err: ConnectError) -> Self {
        match err {
            ConnectError::Api { status: 422, message } => LedgerError::rejected(422, message),
            ConnectError::Api {
                status: status @ (401 | 403),
                message,
            } => LedgerError::Auth(format!("{} ({})", message, status)),
            ConnectError::Api { status, message } => LedgerError::api(status, message),
            ConnectError::Http(e) => LedgerError::Transport(e.to_string()),
            ConnectError::Json(e) => LedgerError::InvalidResponse(e.to_string()),
            ConnectError::InvalidRequest(msg) => {
                LedgerError::InvalidResponse(format!("invalid request: {}", msg))
            }
            ConnectError::InvalidResponse(msg) => LedgerError::InvalidResponse(msg),
            ConnectError::Auth(msg) => LedgerError::Auth(msg),
        }
    }
}
