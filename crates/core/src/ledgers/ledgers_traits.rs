use async_trait::async_trait;

use super::{SourceAccount, TargetAccount, TargetTransaction, TransactionPage};
use crate::errors::LedgerError;

/// Read side: the bank aggregation service transactions are pulled from.
#[async_trait]
pub trait SourceLedgerGateway: Send + Sync {
    async fn list_accounts(&self, user_id: &str) -> Result<Vec<SourceAccount>, LedgerError>;

    /// Fetches one page of transactions for `account_id` posted since
    /// `since` (`YYYY-MM-DD`). Pass `page = None` for the first page and the
    /// previous page's `next_page` afterwards.
    async fn list_transactions_page(
        &self,
        user_id: &str,
        account_id: &str,
        since: &str,
        page: Option<&str>,
    ) -> Result<TransactionPage, LedgerError>;
}

/// Write side: the bookkeeping service transactions are replayed into.
#[async_trait]
pub trait TargetLedgerGateway: Send + Sync {
    async fn list_asset_accounts(&self) -> Result<Vec<TargetAccount>, LedgerError>;

    /// Submits one transaction. A duplicate or validation refusal is reported
    /// as `LedgerError::Rejected`.
    async fn create_transaction(&self, transaction: &TargetTransaction)
        -> Result<(), LedgerError>;
}
