//! Engine configuration and pass reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Days fetched for an account that has never been synchronized.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Largest lookback accepted from configuration (about a century).
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Upper bound on pages fetched for one account in one pass.
pub const DEFAULT_MAX_PAGES_PER_ACCOUNT: usize = 1000;

/// What to do with a source amount that does not parse as a decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedAmountPolicy {
    /// Submit the transaction with an amount of zero.
    #[default]
    TreatAsZero,
    /// Skip the transaction and count it as failed.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub lookback_days: i64,
    pub malformed_amount_policy: MalformedAmountPolicy,
    pub max_pages_per_account: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            malformed_amount_policy: MalformedAmountPolicy::default(),
            max_pages_per_account: DEFAULT_MAX_PAGES_PER_ACCOUNT,
        }
    }
}

/// What started a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Startup,
    Periodic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSyncStatus {
    /// Transactions were fetched and submitted; individual submissions may
    /// still have been rejected or failed.
    Completed,
    /// The source ledger could not deliver this account's transactions.
    FetchFailed,
    /// The account's watermark could not be read or written.
    StateError,
}

/// Outcome of one mapping within a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSyncReport {
    pub source_account_id: String,
    pub target_account_id: String,
    pub display_name: String,
    pub status: AccountSyncStatus,
    pub since: Option<String>,
    pub fetched: usize,
    pub imported: usize,
    pub rejected: usize,
    pub failed: usize,
    pub previous_watermark: Option<String>,
    pub watermark: Option<String>,
    pub error: Option<String>,
}

impl AccountSyncReport {
    pub fn new(
        source_account_id: impl Into<String>,
        target_account_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            source_account_id: source_account_id.into(),
            target_account_id: target_account_id.into(),
            display_name: display_name.into(),
            status: AccountSyncStatus::Completed,
            since: None,
            fetched: 0,
            imported: 0,
            rejected: 0,
            failed: 0,
            previous_watermark: None,
            watermark: None,
            error: None,
        }
    }

    fn skipped(mut self, status: AccountSyncStatus, error: impl ToString) -> Self {
        self.status = status;
        self.error = Some(error.to_string());
        self
    }

    pub fn fetch_failed(self, error: impl ToString) -> Self {
        self.skipped(AccountSyncStatus::FetchFailed, error)
    }

    pub fn state_error(self, error: impl ToString) -> Self {
        self.skipped(AccountSyncStatus::StateError, error)
    }
}

/// Aggregate outcome of one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub accounts: Vec<AccountSyncReport>,
    pub total_imported: usize,
}

impl SyncReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            accounts: Vec::new(),
            total_imported: 0,
        }
    }

    pub fn push(&mut self, account: AccountSyncReport) {
        self.total_imported += account.imported;
        self.accounts.push(account);
    }

    pub fn account(&self, source_account_id: &str) -> Option<&AccountSyncReport> {
        self.accounts
            .iter()
            .find(|a| a.source_account_id == source_account_id)
    }

    /// Human-readable outcome persisted as the last-run summary.
    pub fn summary(&self) -> String {
        format!("Success: {} transactions", self.total_imported)
    }
}

/// Summary persisted when a pass aborts.
pub fn failure_summary(reason: &impl std::fmt::Display) -> String {
    format!("Failed: {}", reason)
}
