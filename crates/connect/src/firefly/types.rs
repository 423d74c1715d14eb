//! Wire types of the Firefly III v1 API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use fidi_core::ledgers::{TargetAccount, TargetTransaction};

/// JSON:API list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct FireflyList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub links: FireflyLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FireflyLinks {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FireflyAccount {
    pub id: String,
    pub attributes: FireflyAccountAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FireflyAccountAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub account_type: String,
    #[serde(default)]
    pub current_balance: Option<String>,
}

impl From<FireflyAccount> for TargetAccount {
    fn from(account: FireflyAccount) -> Self {
        Self {
            id: account.id,
            name: account.attributes.name,
            account_type: account.attributes.account_type,
            current_balance: account.attributes.current_balance,
        }
    }
}

/// One split of a stored transaction group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FireflyTransactionSplit {
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub date: String,
    pub amount: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<String>,
    pub external_id: String,
}

impl From<&TargetTransaction> for FireflyTransactionSplit {
    fn from(tx: &TargetTransaction) -> Self {
        Self {
            transaction_type: tx.transaction_type.as_str().to_string(),
            date: tx.date.clone(),
            amount: tx.amount.clone(),
            description: tx.description.clone(),
            source_id: tx.source_account_id.clone(),
            destination_id: tx.destination_account_id.clone(),
            external_id: tx.external_id.clone(),
        }
    }
}

/// Body of `POST /api/v1/transactions`.
#[derive(Debug, Clone, Serialize)]
pub struct FireflyTransactionStore {
    pub error_if_duplicate_hash: bool,
    pub apply_rules: bool,
    pub transactions: Vec<FireflyTransactionSplit>,
}

impl FireflyTransactionStore {
    pub fn single(split: FireflyTransactionSplit) -> Self {
        Self {
            error_if_duplicate_hash: true,
            apply_rules: true,
            transactions: vec![split],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FireflyErrorResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Message from a Firefly III error document, if the body is one.
pub fn describe_error(body: &str) -> Option<String> {
    let response = serde_json::from_str::<FireflyErrorResponse>(body).ok()?;
    let detail = response.errors.into_values().flatten().next();
    match (response.message.is_empty(), detail) {
        (true, None) => None,
        (true, Some(detail)) => Some(detail),
        (false, None) => Some(response.message),
        (false, Some(detail)) if detail == response.message => Some(detail),
        (false, Some(detail)) => Some(format!("{} ({})", response.message, detail)),
    }
}
