//! Plumbing shared by both ledger clients.

use log::debug;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ConnectError, Result};

/// Default timeout for API requests.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

pub(crate) fn build_http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()?)
}

/// First `MAX_LOG_BODY_CHARS` characters of a response body.
pub(crate) fn preview(body: &str) -> String {
    let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
    if body.chars().count() > MAX_LOG_BODY_CHARS {
        preview.push_str("...");
    }
    preview
}

fn log_response(component: &str, status: reqwest::StatusCode, body: &str) {
    if status.is_success() {
        debug!("[{}] API response status: {}", component, status);
        return;
    }
    debug!(
        "[{}] API response error ({}): {}",
        component,
        status,
        preview(body)
    );
}

/// Reads the body and turns a non-success status into `ConnectError::Api`,
/// using `describe` to pull a message out of the ledger's error document.
async fn read_body(
    component: &str,
    response: reqwest::Response,
    describe: fn(&str) -> Option<String>,
) -> Result<(reqwest::StatusCode, String)> {
    let status = response.status();
    let body = response.text().await?;
    log_response(component, status, &body);

    if !status.is_success() {
        let message = describe(&body)
            .unwrap_or_else(|| format!("Request failed: {}", preview(&body)));
        return Err(ConnectError::api(status.as_u16(), message));
    }
    Ok((status, body))
}

pub(crate) async fn parse_response<T: DeserializeOwned>(
    component: &str,
    response: reqwest::Response,
    describe: fn(&str) -> Option<String>,
) -> Result<T> {
    let (status, body) = read_body(component, response, describe).await?;
    serde_json::from_str(&body).map_err(|e| {
        log::error!(
            "[{}] Failed to deserialize response ({}). Body: {}, Error: {}",
            component,
            status,
            preview(&body),
            e
        );
        ConnectError::from(e)
    })
}

pub(crate) async fn check_response(
    component: &str,
    response: reqwest::Response,
    describe: fn(&str) -> Option<String>,
) -> Result<()> {
    read_body(component, response, describe).await.map(|_| ())
}

/// Resolves a pagination link against `base_url`. Relative paths are joined
/// to it; absolute links must stay on the same host and prefix.
pub(crate) fn resolve_link(base_url: &str, link: &str) -> Result<String> {
    let link = link.trim();
    if link.starts_with("http://") || link.starts_with("https://") {
        if link == base_url || link.starts_with(&format!("{}/", base_url)) {
            return Ok(link.to_string());
        }
        return Err(ConnectError::invalid_response(format!(
            "pagination link {} is outside {}",
            link, base_url
        )));
    }
    if link.starts_with('/') {
        return Ok(format!("{}{}", base_url, link));
    }
    Err(ConnectError::invalid_response(format!(
        "unusable pagination link '{}'",
        link
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_bodies() {
        let body = "x".repeat(600);
        let preview = preview(&body);
        assert_eq!(preview.len(), MAX_LOG_BODY_CHARS + 3);
        assert!(preview.ends_with("..."));
        assert_eq!(super::preview("short"), "short");
    }

    #[test]
    fn links_resolve_against_base() {
        let base = "https://au-api.basiq.io";
        assert_eq!(
            resolve_link(base, "https://au-api.basiq.io/users/u/transactions?next=abc").unwrap(),
            "https://au-api.basiq.io/users/u/transactions?next=abc"
        );
        assert_eq!(
            resolve_link(base, "/users/u/transactions?next=abc").unwrap(),
            "https://au-api.basiq.io/users/u/transactions?next=abc"
        );
    }

    #[test]
    fn foreign_links_are_refused() {
        let base = "https://au-api.basiq.io";
        assert!(resolve_link(base, "https://evil.example/steal").is_err());
        assert!(resolve_link(base, "https://au-api.basiq.io.evil.example/x").is_err());
        assert!(resolve_link(base, "users/u").is_err());
    }
}
