use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error, info, warn};

use super::{
    advance, failure_summary, parse_amount, parse_stored, resolve_since, translate, try_translate,
    watermark_key, AccountSyncReport, MalformedAmountPolicy, RunStatus, SyncConfig, SyncReport,
    SyncServiceTrait, SyncStateRepositoryTrait, LAST_RUN_KEY, LAST_RUN_STATUS_KEY,
    SOURCE_USER_ID_KEY,
};
use crate::errors::{LedgerError, Result, SyncError};
use crate::ledgers::{SourceLedgerGateway, SourceTransaction, TargetLedgerGateway};
use crate::mappings::{AccountMapping, AccountMappingRepositoryTrait};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::time_utils::{format_date, normalize_date};

/// Coordinates one synchronization pass across every mapped account.
pub struct SyncService {
    mapping_repository: Arc<dyn AccountMappingRepositoryTrait>,
    state_repository: Arc<dyn SyncStateRepositoryTrait>,
    source_ledger: Arc<dyn SourceLedgerGateway>,
    target_ledger: Arc<dyn TargetLedgerGateway>,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
}

impl SyncService {
    pub fn new(
        mapping_repository: Arc<dyn AccountMappingRepositoryTrait>,
        state_repository: Arc<dyn SyncStateRepositoryTrait>,
        source_ledger: Arc<dyn SourceLedgerGateway>,
        target_ledger: Arc<dyn TargetLedgerGateway>,
    ) -> Self {
        Self {
            mapping_repository,
            state_repository,
            source_ledger,
            target_ledger,
            config: SyncConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn connected_user_id(&self) -> Result<Option<String>> {
        let user_id = self.state_repository.get_value(SOURCE_USER_ID_KEY)?;
        Ok(user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()))
    }

    async fn run_pass(&self, started_at: DateTime<Utc>) -> Result<SyncReport> {
        let user_id = self.connected_user_id()?.ok_or(SyncError::NotConnected)?;

        let mappings = self.mapping_repository.list_mappings()?;
        if mappings.is_empty() {
            return Err(SyncError::NothingMapped.into());
        }

        info!(
            "[Sync] Starting pass for {} mapped account(s)",
            mappings.len()
        );

        let mut report = SyncReport::new(started_at);
        for mapping in &mappings {
            let account = self.sync_account(&user_id, mapping, started_at).await;
            report.push(account);
        }

        info!("[Sync] Pass complete: {}", report.summary());
        Ok(report)
    }

    async fn sync_account(
        &self,
        user_id: &str,
        mapping: &AccountMapping,
        started_at: DateTime<Utc>,
    ) -> AccountSyncReport {
        let account = AccountSyncReport::new(
            mapping.source_account_id.clone(),
            mapping.target_account_id.clone(),
            mapping.display_name.clone(),
        );
        info!(
            "[Sync] Syncing {} -> {} ({})",
            mapping.source_account_id, mapping.target_account_id, mapping.display_name
        );

        let key = watermark_key(&mapping.source_account_id);
        let stored = match self.state_repository.get_value(&key) {
            Ok(stored) => stored.filter(|value| !value.trim().is_empty()),
            Err(err) => {
                error!(
                    "[Sync] Could not read watermark for {}: {}",
                    mapping.source_account_id, err
                );
                return account.state_error(err);
            }
        };

        let previous = parse_stored(stored.as_deref());
        if let (Some(raw), None) = (stored.as_deref(), previous) {
            warn!(
                "[Sync] Ignoring unreadable watermark '{}' for {}",
                raw, mapping.source_account_id
            );
        }
        let since = format_date(resolve_since(
            stored.as_deref(),
            started_at,
            self.config.lookback_days,
        ));

        let mut account = AccountSyncReport {
            since: Some(since.clone()),
            previous_watermark: stored.clone(),
            watermark: stored.clone(),
            ..account
        };

        let transactions = match self
            .fetch_all(user_id, &mapping.source_account_id, &since)
            .await
        {
            Ok(transactions) => transactions,
            Err(err) => {
                let err = SyncError::AccountFetchFailed {
                    account_id: mapping.source_account_id.clone(),
                    message: err.to_string(),
                };
                warn!("[Sync] {}. Skipping account.", err);
                return account.fetch_failed(err);
            }
        };
        account.fetched = transactions.len();
        debug!(
            "[Sync] Fetched {} transaction(s) for {} since {}",
            transactions.len(),
            mapping.source_account_id,
            since
        );

        let mut observed: Option<NaiveDate> = None;
        for transaction in &transactions {
            match normalize_date(&transaction.post_date) {
                Some(date) => observed = advance(observed, Some(date)),
                None => warn!(
                    "[Sync] Transaction {} has unreadable post date '{}'",
                    transaction.id, transaction.post_date
                ),
            }
            self.submit(transaction, mapping, &mut account).await;
        }

        let next = advance(previous, observed);
        if let Some(date) = next.filter(|date| Some(*date) != previous) {
            let value = format_date(date);
            if let Err(err) = self.state_repository.set_value(key, value.clone()).await {
                error!(
                    "[Sync] Could not store watermark for {}: {}",
                    mapping.source_account_id, err
                );
                return account.state_error(err);
            }
            account.watermark = Some(value);
        }

        info!(
            "[Sync] {}: imported {} of {} (rejected {}, failed {})",
            mapping.source_account_id,
            account.imported,
            account.fetched,
            account.rejected,
            account.failed
        );
        account
    }

    /// Collects every page for one account.
    async fn fetch_all(
        &self,
        user_id: &str,
        account_id: &str,
        since: &str,
    ) -> std::result::Result<Vec<SourceTransaction>, LedgerError> {
        let mut transactions = Vec::new();
        let mut seen_pages: HashSet<String> = HashSet::new();
        let mut page: Option<String> = None;
        let mut fetched_pages = 0usize;

        loop {
            if fetched_pages >= self.config.max_pages_per_account {
                return Err(LedgerError::InvalidResponse(format!(
                    "more than {} pages of transactions",
                    self.config.max_pages_per_account
                )));
            }

            let result = self
                .source_ledger
                .list_transactions_page(user_id, account_id, since, page.as_deref())
                .await?;
            fetched_pages += 1;
            transactions.extend(result.transactions);

            match result.next_page.filter(|next| !next.is_empty()) {
                None => break,
                Some(next) => {
                    if !seen_pages.insert(next.clone()) {
                        return Err(LedgerError::InvalidResponse(format!(
                            "page '{}' was returned twice",
                            next
                        )));
                    }
                    page = Some(next);
                }
            }
        }

        Ok(transactions)
    }

    async fn submit(
        &self,
        transaction: &SourceTransaction,
        mapping: &AccountMapping,
        account: &mut AccountSyncReport,
    ) {
        let target = match self.config.malformed_amount_policy {
            MalformedAmountPolicy::TreatAsZero => {
                if parse_amount(&transaction.amount).is_none() {
                    warn!(
                        "[Sync] Transaction {} has malformed amount '{}', submitting as 0.00",
                        transaction.id, transaction.amount
                    );
                }
                translate(transaction, mapping)
            }
            MalformedAmountPolicy::Reject => match try_translate(transaction, mapping) {
                Ok(target) => target,
                Err(err) => {
                    warn!("[Sync] {}. Not submitted.", err);
                    account.failed += 1;
                    return;
                }
            },
        };

        match self.target_ledger.create_transaction(&target).await {
            Ok(()) => account.imported += 1,
            Err(err) if err.is_rejection() => {
                let err = SyncError::TransactionSubmitRejected {
                    transaction_id: transaction.id.clone(),
                    message: err.to_string(),
                };
                info!("[Sync] {}", err);
                account.rejected += 1;
            }
            Err(err) => {
                let err = SyncError::TransactionSubmitFailed {
                    transaction_id: transaction.id.clone(),
                    message: err.to_string(),
                };
                error!("[Sync] {}", err);
                account.failed += 1;
            }
        }
    }

    async fn record_run_status(&self, started_at: DateTime<Utc>, summary: String) {
        if let Err(err) = self
            .state_repository
            .set_value(LAST_RUN_KEY.to_string(), started_at.to_rfc3339())
            .await
        {
            error!("[Sync] Could not store last run time: {}", err);
        }
        if let Err(err) = self
            .state_repository
            .set_value(LAST_RUN_STATUS_KEY.to_string(), summary)
            .await
        {
            error!("[Sync] Could not store last run status: {}", err);
        }
    }
}

#[async_trait]
impl SyncServiceTrait for SyncService {
    async fn perform_sync(&self) -> Result<SyncReport> {
        let started_at = self.clock.now();
        let outcome = self.run_pass(started_at).await;

        let summary = match &outcome {
            Ok(report) => report.summary(),
            Err(err) => {
                warn!("[Sync] Pass aborted: {}", err);
                failure_summary(err)
            }
        };
        self.record_run_status(started_at, summary).await;

        outcome
    }

    fn get_run_status(&self) -> Result<RunStatus> {
        Ok(RunStatus {
            last_run_timestamp: self.state_repository.get_value(LAST_RUN_KEY)?,
            last_run_summary: self.state_repository.get_value(LAST_RUN_STATUS_KEY)?,
        })
    }

    fn is_connected(&self) -> Result<bool> {
        Ok(self.connected_user_id()?.is_some())
    }
}
