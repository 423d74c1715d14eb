//! Basiq API client.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use fidi_core::errors::LedgerError;
use fidi_core::ledgers::{SourceAccount, SourceLedgerGateway, TransactionPage};

use super::types::{
    describe_error, BasiqAccount, BasiqList, BasiqTransaction, BasiqUser, CreateUserRequest,
    TokenResponse,
};
use crate::error::{ConnectError, Result};
use crate::http::{build_http_client, parse_response, resolve_link};

pub const DEFAULT_BASIQ_API_URL: &str = "https://au-api.basiq.io";
const BASIQ_VERSION: &str = "3.0";
const COMPONENT: &str = "Basiq";
/// Tokens are refreshed this long before Basiq says they expire.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client for the Basiq open-banking API.
#[derive(Debug)]
pub struct BasiqClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    server_token: Mutex<Option<CachedToken>>,
}

impl BasiqClient {
    /// Create a new Basiq client.
    ///
    /// * `base_url` - API root, e.g. "https://au-api.basiq.io"
    /// * `api_key` - the application API key, sent as Basic credentials
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ConnectError::auth("Basiq API key is not configured"));
        }
        Ok(Self {
            client: build_http_client()?,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            server_token: Mutex::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// POST /token
    async fn request_token(&self, form: String) -> Result<TokenResponse> {
        let url = format!("{}/token", self.base_url);
        let basic = HeaderValue::from_str(&format!("Basic {}", self.api_key))
            .map_err(|_| ConnectError::auth("Invalid API key format"))?;

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, basic)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("basiq-version", BASIQ_VERSION)
            .body(form)
            .send()
            .await?;

        parse_response(COMPONENT, response, describe_error)
            .await
            .map_err(|err| match err {
                ConnectError::Api {
                    status: status @ (400 | 401 | 403),
                    message,
                } => ConnectError::auth(format!("token request refused ({}): {}", status, message)),
                other => other,
            })
    }

    /// Server-scoped access token, reused until shortly before it expires.
    async fn server_token(&self) -> Result<String> {
        let mut cached = self.server_token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        debug!("[Basiq] Requesting server access token");
        let token = self.request_token("scope=SERVER_ACCESS".to_string()).await?;
        let lifetime = token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(token.access_token)
    }

    /// Client-scoped token for the consent UI of one user.
    pub async fn client_token(&self, user_id: &str) -> Result<String> {
        let form = format!(
            "scope=CLIENT_ACCESS&userId={}",
            urlencoding::encode(user_id)
        );
        Ok(self.request_token(form).await?.access_token)
    }

    async fn headers(&self) -> Result<HeaderMap> {
        let token = self.server_token().await?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("basiq-version", HeaderValue::from_static(BASIQ_VERSION));
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ConnectError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);
        Ok(headers)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .headers(self.headers().await?)
            .send()
            .await?;
        parse_response(COMPONENT, response, describe_error).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    /// POST /users
    pub async fn create_user(&self, email: Option<&str>, mobile: Option<&str>) -> Result<BasiqUser> {
        let url = format!("{}/users", self.base_url);
        let request = CreateUserRequest {
            email: email.map(str::trim).filter(|v| !v.is_empty()).map(String::from),
            mobile: mobile.map(str::trim).filter(|v| !v.is_empty()).map(String::from),
        };
        if request.email.is_none() && request.mobile.is_none() {
            return Err(ConnectError::invalid_request(
                "an email address or mobile number is required to create a user",
            ));
        }

        let response = self
            .client
            .post(&url)
            .headers(self.headers().await?)
            .json(&request)
            .send()
            .await?;

        let user: BasiqUser = parse_response(COMPONENT, response, describe_error).await?;
        info!("[Basiq] Created user {}", user.id);
        Ok(user)
    }

    /// GET /users/{userId}
    pub async fn get_user(&self, user_id: &str) -> Result<BasiqUser> {
        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(user_id));
        self.get_json(&url).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accounts and transactions
    // ─────────────────────────────────────────────────────────────────────────

    /// GET /users/{userId}/accounts
    pub async fn get_accounts(&self, user_id: &str) -> Result<Vec<BasiqAccount>> {
        let url = format!(
            "{}/users/{}/accounts",
            self.base_url,
            urlencoding::encode(user_id)
        );
        let list: BasiqList<BasiqAccount> = self.get_json(&url).await?;
        Ok(list.data)
    }

    /// URL of the first transactions page of one account, posted on or
    /// after `since`.
    fn transactions_url(&self, user_id: &str, account_id: &str, since: &str) -> String {
        let filter = format!(
            "account.id.eq('{}'),postDate.gteq('{}')",
            account_id, since
        );
        format!(
            "{}/users/{}/transactions?filter={}",
            self.base_url,
            urlencoding::encode(user_id),
            urlencoding::encode(&filter)
        )
    }

    /// GET /users/{userId}/transactions, or the `links.next` URL of a
    /// previous page when `page` is given.
    pub async fn get_transactions_page(
        &self,
        user_id: &str,
        account_id: &str,
        since: &str,
        page: Option<&str>,
    ) -> Result<BasiqList<BasiqTransaction>> {
        let url = match page {
            Some(next) => resolve_link(&self.base_url, next)?,
            None => self.transactions_url(user_id, account_id, since),
        };
        debug!("[Basiq] Fetching transactions: {}", url);
        self.get_json(&url).await
    }
}

#[async_trait]
impl SourceLedgerGateway for BasiqClient {
    async fn list_accounts(&self, user_id: &str) -> std::result::Result<Vec<SourceAccount>, LedgerError> {
        let accounts = self.get_accounts(user_id).await?;
        Ok(accounts.into_iter().map(SourceAccount::from).collect())
    }

    async fn list_transactions_page(
        &self,
        user_id: &str,
        account_id: &str,
        since: &str,
        page: Option<&str>,
    ) -> std::result::Result<TransactionPage, LedgerError> {
        let list = self
            .get_transactions_page(user_id, account_id, since, page)
            .await?;
        Ok(TransactionPage {
            transactions: list.data.into_iter().map(Into::into).collect(),
            next_page: list.links.next.filter(|next| !next.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_token(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("authorization", "Basic test-key"))
            .and(header("basiq-version", "3.0"))
            .and(body_string("scope=SERVER_ACCESS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "server-token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    fn client(server: &MockServer) -> BasiqClient {
        BasiqClient::new(&server.uri(), "test-key").unwrap()
    }

    #[test]
    fn missing_api_key_is_refused() {
        assert!(matches!(
            BasiqClient::new(DEFAULT_BASIQ_API_URL, "  "),
            Err(ConnectError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn server_token_is_cached() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/users/u1/accounts"))
            .and(bearer_token("server-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "list",
                "data": [{
                    "type": "account",
                    "id": "A1",
                    "accountNo": "123456",
                    "name": "Everyday",
                    "currency": "AUD",
                    "balance": "100.00",
                    "class": {"type": "transaction", "product": "Everyday"},
                    "institution": "AU00000"
                }]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client(&server);
        let first = client.list_accounts("u1").await.unwrap();
        let second = client.list_accounts("u1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "A1");
        assert_eq!(first[0].account_no.as_deref(), Some("123456"));
        assert_eq!(first[0].institution.as_deref(), Some("AU00000"));
    }

    #[tokio::test]
    async fn transactions_are_filtered_by_account_and_date() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        let next = format!("{}/users/u1/transactions?next=cursor-2", server.uri());
        Mock::given(method("GET"))
            .and(path("/users/u1/transactions"))
            .and(query_param(
                "filter",
                "account.id.eq('A1'),postDate.gteq('2024-01-11')",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "list",
                "data": [{
                    "type": "transaction",
                    "id": "t1",
                    "amount": "-10.00",
                    "description": "COFFEE",
                    "postDate": "2024-01-12T00:00:00Z",
                    "account": "A1"
                }],
                "links": {"self": "ignored", "next": next}
            })))
            .mount(&server)
            .await;

        let page = client(&server)
            .list_transactions_page("u1", "A1", "2024-01-11", None)
            .await
            .unwrap();

        assert_eq!(page.transactions.len(), 1);
        assert_eq!(page.transactions[0].id, "t1");
        assert_eq!(page.transactions[0].amount, "-10.00");
        assert_eq!(page.transactions[0].post_date, "2024-01-12T00:00:00Z");
        assert_eq!(page.next_page.as_deref(), Some(next.as_str()));
    }

    #[tokio::test]
    async fn next_page_link_is_followed() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/users/u1/transactions"))
            .and(query_param("next", "cursor-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "list",
                "data": [{"id": "t2", "amount": "5.00", "postDate": "2024-01-13", "account": "A1"}],
                "links": {"self": "ignored"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let next = format!("{}/users/u1/transactions?next=cursor-2", server.uri());
        let page = client(&server)
            .list_transactions_page("u1", "A1", "2024-01-11", Some(&next))
            .await
            .unwrap();

        assert_eq!(page.transactions[0].id, "t2");
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn foreign_next_link_is_not_requested() {
        let server = MockServer::start().await;

        let err = client(&server)
            .list_transactions_page("u1", "A1", "2024-01-11", Some("https://elsewhere.example/p2"))
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn refused_token_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "type": "list",
                "data": [{"type": "error", "code": "unauthorized-access", "title": "Unauthorized", "detail": "Invalid API key"}]
            })))
            .mount(&server)
            .await;

        let err = client(&server).list_accounts("u1").await.unwrap_err();

        match err {
            LedgerError::Auth(message) => assert!(message.contains("Invalid API key")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/users/u1/accounts"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let err = client(&server).list_accounts("u1").await.unwrap_err();

        assert_eq!(err.status_code(), Some(503));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn create_user_posts_contact_details() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(bearer_token("server-token"))
            .and(wiremock::matchers::body_json(json!({"email": "me@example.com"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "type": "user",
                "id": "new-user",
                "email": "me@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = client(&server)
            .create_user(Some(" me@example.com "), Some(""))
            .await
            .unwrap();

        assert_eq!(user.id, "new-user");
    }

    #[tokio::test]
    async fn create_user_needs_contact_details() {
        let server = MockServer::start().await;
        let err = client(&server).create_user(None, Some(" ")).await.unwrap_err();
        assert!(matches!(err, ConnectError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn client_token_is_scoped_to_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string("scope=CLIENT_ACCESS&userId=u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "client-token",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).client_token("u1").await.unwrap(), "client-token");
    }
}
