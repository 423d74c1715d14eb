//! Keys and records of the scalar sync state.

use serde::{Deserialize, Serialize};

/// Key holding the connected source-ledger user id.
pub const SOURCE_USER_ID_KEY: &str = "basiq_user_id";

/// Prefix of the per-account watermark keys.
pub const WATERMARK_KEY_PREFIX: &str = "last_sync_";

/// Key holding the start time of the last pass (RFC 3339).
pub const LAST_RUN_KEY: &str = "last_run";

/// Key holding the outcome summary of the last pass.
pub const LAST_RUN_STATUS_KEY: &str = "last_run_status";

pub fn watermark_key(source_account_id: &str) -> String {
    format!("{}{}", WATERMARK_KEY_PREFIX, source_account_id)
}

/// Outcome of the most recent pass, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    pub last_run_timestamp: Option<String>,
    pub last_run_summary: Option<String>,
}
