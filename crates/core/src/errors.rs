//! Error taxonomy shared by every fidi crate.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Storage failures, reported by the store implementation.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Synchronization failures.
///
/// Only `NotConnected` and `NothingMapped` abort a pass. The per-account and
/// per-transaction variants are recorded on the run report and the pass
/// continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("no source ledger user connected")]
    NotConnected,

    #[error("no accounts mapped")]
    NothingMapped,

    #[error("a synchronization pass is already running")]
    AlreadyRunning,

    #[error("failed to fetch transactions for account {account_id}: {message}")]
    AccountFetchFailed { account_id: String, message: String },

    #[error("transaction {transaction_id} rejected: {message}")]
    TransactionSubmitRejected {
        transaction_id: String,
        message: String,
    },

    #[error("transaction {transaction_id} failed: {message}")]
    TransactionSubmitFailed {
        transaction_id: String,
        message: String,
    },

    #[error("transaction {transaction_id} has a malformed amount '{amount}'")]
    MalformedAmount {
        transaction_id: String,
        amount: String,
    },
}

/// Errors reported by the source and target ledger gateways.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger refused the request as a duplicate or as invalid.
    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LedgerError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// True when the ledger declined the record itself (duplicate / validation)
    /// rather than failing to process the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// HTTP status if the ledger answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_distinguished_from_hard_failures() {
        assert!(LedgerError::rejected(422, "duplicate").is_rejection());
        assert!(!LedgerError::api(500, "boom").is_rejection());
        assert!(!LedgerError::Transport("connection refused".to_string()).is_rejection());
    }

    #[test]
    fn status_code_only_for_answered_requests() {
        assert_eq!(LedgerError::rejected(422, "dup").status_code(), Some(422));
        assert_eq!(LedgerError::api(503, "down").status_code(), Some(503));
        assert_eq!(LedgerError::Auth("bad key".to_string()).status_code(), None);
    }

    #[test]
    fn precondition_messages_are_human_readable() {
        assert_eq!(SyncError::NothingMapped.to_string(), "no accounts mapped");
        assert_eq!(
            Error::from(SyncError::NotConnected).to_string(),
            "no source ledger user connected"
        );
    }
}
