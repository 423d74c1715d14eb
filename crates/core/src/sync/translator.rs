//! Source transaction -> target transaction translation.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::errors::SyncError;
use crate::ledgers::{SourceTransaction, TargetTransaction, TargetTransactionType};
use crate::mappings::AccountMapping;

/// Parses a signed decimal amount as sent by the source ledger.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Unsigned amount with exactly two decimal places.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Translates one source transaction for the mapped target account.
///
/// Negative amounts become withdrawals from the mapped account, everything
/// else (zero included) becomes a deposit into it. An amount that does not
/// parse is treated as zero; use [`try_translate`] to refuse it instead.
pub fn translate(transaction: &SourceTransaction, mapping: &AccountMapping) -> TargetTransaction {
    let amount = parse_amount(&transaction.amount).unwrap_or(Decimal::ZERO);
    build(transaction, mapping, amount)
}

/// Like [`translate`], but fails on an amount that does not parse.
pub fn try_translate(
    transaction: &SourceTransaction,
    mapping: &AccountMapping,
) -> Result<TargetTransaction, SyncError> {
    let amount =
        parse_amount(&transaction.amount).ok_or_else(|| SyncError::MalformedAmount {
            transaction_id: transaction.id.clone(),
            amount: transaction.amount.clone(),
        })?;
    Ok(build(transaction, mapping, amount))
}

fn build(
    transaction: &SourceTransaction,
    mapping: &AccountMapping,
    amount: Decimal,
) -> TargetTransaction {
    let (transaction_type, source_account_id, destination_account_id) = if amount < Decimal::ZERO
    {
        (
            TargetTransactionType::Withdrawal,
            Some(mapping.target_account_id.clone()),
            None,
        )
    } else {
        (
            TargetTransactionType::Deposit,
            None,
            Some(mapping.target_account_id.clone()),
        )
    };

    TargetTransaction {
        transaction_type,
        amount: format_amount(amount),
        date: transaction.post_date.clone(),
        description: transaction.description.clone(),
        source_account_id,
        destination_account_id,
        external_id: transaction.id.clone(),
    }
}
