use async_trait::async_trait;

use super::{RunStatus, SyncReport};
use crate::errors::Result;

/// Scalar key/value persistence for watermarks and run status.
#[async_trait]
pub trait SyncStateRepositoryTrait: Send + Sync {
    /// Value stored under `key`, `None` when the key was never written.
    fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_value(&self, key: String, value: String) -> Result<()>;
}

#[async_trait]
pub trait SyncServiceTrait: Send + Sync {
    /// Runs one synchronization pass across every mapped account.
    ///
    /// Fails only when a precondition does not hold (no connected user, no
    /// mappings) or the store is unusable. Per-account and per-transaction
    /// problems are reported in the returned `SyncReport`.
    async fn perform_sync(&self) -> Result<SyncReport>;

    fn get_run_status(&self) -> Result<RunStatus>;

    /// True when a source-ledger user id is stored.
    fn is_connected(&self) -> Result<bool>;
}
