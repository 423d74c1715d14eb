//! Wire types of the Basiq v3 API.

use serde::{Deserialize, Serialize};

use fidi_core::ledgers::{SourceAccount, SourceTransaction};

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Basiq list envelope: `{ "data": [...], "links": { "next": ... } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct BasiqList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub links: BasiqLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasiqLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasiqAccountClass {
    #[serde(rename = "type", default)]
    pub class_type: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasiqAccount {
    pub id: String,
    #[serde(default)]
    pub account_no: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
    #[serde(default)]
    pub available_funds: Option<String>,
    #[serde(default)]
    pub class: Option<BasiqAccountClass>,
    #[serde(default)]
    pub institution: Option<String>,
}

impl From<BasiqAccount> for SourceAccount {
    fn from(account: BasiqAccount) -> Self {
        Self {
            id: account.id,
            name: account.name,
            account_no: account.account_no,
            currency: account.currency,
            balance: account.balance,
            institution: account.institution,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasiqTransaction {
    pub id: String,
    /// `debit` or `credit`.
    #[serde(rename = "type", default)]
    pub transaction_type: Option<String>,
    pub amount: String,
    #[serde(default)]
    pub description: String,
    /// Null while the transaction is pending.
    #[serde(default)]
    pub post_date: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<String>,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub balance: Option<String>,
}

impl From<BasiqTransaction> for SourceTransaction {
    fn from(tx: BasiqTransaction) -> Self {
        Self {
            id: tx.id,
            amount: tx.amount,
            description: tx.description,
            post_date: tx.post_date.or(tx.transaction_date).unwrap_or_default(),
            account_id: tx.account,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasiqUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasiqErrorResponse {
    #[serde(default)]
    pub data: Vec<BasiqErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasiqErrorItem {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Message from a Basiq error document, if the body is one.
pub fn describe_error(body: &str) -> Option<String> {
    let response = serde_json::from_str::<BasiqErrorResponse>(body).ok()?;
    let item = response.data.into_iter().next()?;
    let text = item.detail.or(item.title)?;
    Some(match item.code {
        Some(code) => format!("{}: {}", code, text),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_transaction_falls_back_to_transaction_date() {
        let tx: BasiqTransaction = serde_json::from_str(
            r#"{"id":"t1","amount":"-5.00","description":"x","postDate":null,
                "transactionDate":"2024-01-05T00:00:00Z","account":"A1"}"#,
        )
        .unwrap();
        let source = SourceTransaction::from(tx);
        assert_eq!(source.post_date, "2024-01-05T00:00:00Z");
        assert_eq!(source.account_id, "A1");
    }

    #[test]
    fn error_documents_are_summarised() {
        let body = r#"{"type":"list","data":[{"type":"error","code":"unauthorized-access",
            "title":"Unauthorized Access","detail":"You are not authorized to access this resource"}]}"#;
        assert_eq!(
            describe_error(body).as_deref(),
            Some("unauthorized-access: You are not authorized to access this resource")
        );
        assert_eq!(describe_error("<html>"), None);
    }
}
