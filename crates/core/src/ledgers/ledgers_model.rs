use serde::{Deserialize, Serialize};

/// Account as listed by the source ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAccount {
    pub id: String,
    pub name: String,
    pub account_no: Option<String>,
    pub currency: Option<String>,
    pub balance: Option<String>,
    pub institution: Option<String>,
}

/// Transaction as read from the source ledger. `amount` is a signed decimal
/// string, negative for money leaving the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTransaction {
    pub id: String,
    pub amount: String,
    pub description: String,
    pub post_date: String,
    pub account_id: String,
}

/// One page of source transactions. `next_page` is an opaque token to pass
/// back to the gateway; `None` means no pages remain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPage {
    pub transactions: Vec<SourceTransaction>,
    pub next_page: Option<String>,
}

/// Account as listed by the target ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAccount {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub current_balance: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTransactionType {
    Withdrawal,
    Deposit,
}

impl TargetTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
        }
    }
}

/// Transaction as submitted to the target ledger.
///
/// Exactly one of `source_account_id` / `destination_account_id` is set:
/// the mapped account is the source of a withdrawal and the destination of a
/// deposit. `external_id` carries the source transaction id and is what the
/// target ledger deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TargetTransactionType,
    pub amount: String,
    pub date: String,
    pub description: String,
    pub source_account_id: Option<String>,
    pub destination_account_id: Option<String>,
    pub external_id: String,
}
