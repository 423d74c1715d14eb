//! Firefly III API client.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use std::collections::HashSet;

use fidi_core::errors::LedgerError;
use fidi_core::ledgers::{TargetAccount, TargetLedgerGateway, TargetTransaction};

use super::types::{
    describe_error, FireflyAccount, FireflyList, FireflyTransactionSplit, FireflyTransactionStore,
};
use crate::error::{ConnectError, Result};
use crate::http::{build_http_client, check_response, parse_response, resolve_link};

const COMPONENT: &str = "Firefly";
const MAX_ACCOUNT_PAGES: usize = 100;

/// Client for a Firefly III instance, authenticated with a personal access
/// token.
#[derive(Debug, Clone)]
pub struct FireflyClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl FireflyClient {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ConnectError::invalid_request("Firefly III URL is not configured"));
        }
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(ConnectError::auth("Firefly III access token is not configured"));
        }
        Ok(Self {
            client: build_http_client()?,
            base_url: base_url.to_string(),
            access_token: access_token.to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
            .map_err(|_| ConnectError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    /// GET /api/v1/accounts?type=asset, following `links.next`.
    pub async fn get_asset_accounts(&self) -> Result<Vec<FireflyAccount>> {
        let mut accounts = Vec::new();
        let mut seen = HashSet::new();
        let mut url = self.api_url("/accounts?type=asset");

        for _ in 0..MAX_ACCOUNT_PAGES {
            let response = self
                .client
                .get(&url)
                .headers(self.headers()?)
                .send()
                .await?;
            let page: FireflyList<FireflyAccount> =
                parse_response(COMPONENT, response, describe_error).await?;
            accounts.extend(page.data);

            let Some(next) = page.links.next.filter(|next| !next.trim().is_empty()) else {
                return Ok(accounts);
            };
            let next = resolve_link(&self.base_url, &next)?;
            if !seen.insert(next.clone()) {
                return Err(ConnectError::invalid_response(format!(
                    "account page {} returned twice",
                    next
                )));
            }
            url = next;
        }

        Err(ConnectError::invalid_response(format!(
            "more than {} pages of accounts",
            MAX_ACCOUNT_PAGES
        )))
    }

    /// POST /api/v1/transactions
    ///
    /// Firefly answers 422 for duplicates (same external id or hash) and for
    /// validation failures.
    pub async fn store_transaction(&self, split: FireflyTransactionSplit) -> Result<()> {
        let url = self.api_url("/transactions");
        let external_id = split.external_id.clone();
        let body = FireflyTransactionStore::single(split);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;

        check_response(COMPONENT, response, describe_error).await?;
        debug!("[Firefly] Stored transaction {}", external_id);
        Ok(())
    }
}

#[async_trait]
impl TargetLedgerGateway for FireflyClient {
    async fn list_asset_accounts(&self) -> std::result::Result<Vec<TargetAccount>, LedgerError> {
        let accounts = self.get_asset_accounts().await?;
        Ok(accounts.into_iter().map(TargetAccount::from).collect())
    }

    async fn create_transaction(
        &self,
        transaction: &TargetTransaction,
    ) -> std::result::Result<(), LedgerError> {
        Ok(self.store_transaction(transaction.into()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fidi_core::ledgers::TargetTransactionType;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> FireflyClient {
        FireflyClient::new(&format!("{}/", server.uri()), "pat-123").unwrap()
    }

    fn deposit() -> TargetTransaction {
        TargetTransaction {
            transaction_type: TargetTransactionType::Deposit,
            amount: "20.00".to_string(),
            date: "2024-01-06".to_string(),
            description: "SALARY".to_string(),
            source_account_id: None,
            destination_account_id: Some("F1".to_string()),
            external_id: "t2".to_string(),
        }
    }

    #[test]
    fn configuration_is_required() {
        assert!(matches!(
            FireflyClient::new("", "pat"),
            Err(ConnectError::InvalidRequest(_))
        ));
        assert!(matches!(
            FireflyClient::new("https://firefly.local", " "),
            Err(ConnectError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn create_transaction_posts_single_split() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/transactions"))
            .and(bearer_token("pat-123"))
            .and(body_partial_json(json!({
                "error_if_duplicate_hash": true,
                "transactions": [{
                    "type": "deposit",
                    "date": "2024-01-06",
                    "amount": "20.00",
                    "description": "SALARY",
                    "destination_id": "F1",
                    "external_id": "t2"
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"type": "transactions", "id": "981"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).create_transaction(&deposit()).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_is_reported_as_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/transactions"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Duplicate of transaction #12.",
                "errors": {"transactions.0.description": ["Duplicate of transaction #12."]}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_transaction(&deposit())
            .await
            .unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(
            err,
            LedgerError::rejected(422, "Duplicate of transaction #12.")
        );
    }

    #[tokio::test]
    async fn server_error_is_not_a_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/transactions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_transaction(&deposit())
            .await
            .unwrap_err();

        assert!(!err.is_rejection());
        assert_eq!(err.status_code(), Some(500));
    }

    #[tokio::test]
    async fn asset_accounts_follow_pagination() {
        let server = MockServer::start().await;
        let next = format!("{}/api/v1/accounts?type=asset&page=2", server.uri());
        Mock::given(method("GET"))
            .and(path("/api/v1/accounts"))
            .and(query_param("type", "asset"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"type": "accounts", "id": "F2", "attributes": {
                    "name": "Savings", "type": "asset", "current_balance": "1000.00"}}],
                "links": {}
            })))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/accounts"))
            .and(query_param("type", "asset"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"type": "accounts", "id": "F1", "attributes": {
                    "name": "Checking", "type": "asset", "current_balance": "12.34"}}],
                "links": {"next": next}
            })))
            .mount(&server)
            .await;

        let accounts = client(&server).list_asset_accounts().await.unwrap();

        let ids: Vec<&str> = accounts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["F1", "F2"]);
        assert_eq!(accounts[0].name, "Checking");
        assert_eq!(accounts[1].current_balance.as_deref(), Some("1000.00"));
    }
}
