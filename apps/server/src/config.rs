//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use fidi_connect::basiq::DEFAULT_BASIQ_API_URL;
use fidi_core::sync::{
    MalformedAmountPolicy, SchedulerConfig, SyncConfig, DEFAULT_LOOKBACK_DAYS,
    DEFAULT_SYNC_INTERVAL_SECS, MAX_LOOKBACK_DAYS, MAX_SYNC_INTERVAL_SECS,
};

const DEFAULT_DB_PATH: &str = "database/database.sqlite";
const DEFAULT_PORT: u16 = 80;
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub basiq_api_url: String,
    pub basiq_api_key: Option<String>,
    pub firefly_url: Option<String>,
    pub firefly_access_token: Option<String>,
    pub listen_addr: SocketAddr,
    pub sync_interval: Duration,
    pub sync_run_on_start: bool,
    pub sync_lookback_days: i64,
    pub sync_strict_amounts: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`. Values are trimmed and empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().context("PORT must be a port number")?,
            None => DEFAULT_PORT,
        };
        let bind = var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let listen_addr: SocketAddr = format!("{}:{}", bind, port)
            .parse()
            .with_context(|| format!("BIND_ADDRESS '{}' is not an IP address", bind))?;

        let sync_interval = match var("SYNC_INTERVAL_HOURS") {
            Some(raw) => {
                let hours = raw
                    .parse::<u64>()
                    .context("SYNC_INTERVAL_HOURS must be a whole number of hours")?;
                let secs = hours
                    .checked_mul(60 * 60)
                    .filter(|secs| (1..=MAX_SYNC_INTERVAL_SECS).contains(secs))
                    .ok_or_else(|| {
                        anyhow!(
                            "SYNC_INTERVAL_HOURS must be between 1 and {}",
                            MAX_SYNC_INTERVAL_SECS / (60 * 60)
                        )
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
        };

        let sync_lookback_days = match var("SYNC_LOOKBACK_DAYS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|days| (0..=MAX_LOOKBACK_DAYS).contains(days))
                .ok_or_else(|| {
                    anyhow!("SYNC_LOOKBACK_DAYS must be between 0 and {}", MAX_LOOKBACK_DAYS)
                })?,
            None => DEFAULT_LOOKBACK_DAYS,
        };

        Ok(Self {
            db_path: PathBuf::from(var("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string())),
            basiq_api_url: var("BASIQ_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASIQ_API_URL.to_string()),
            basiq_api_key: var("BASIQ_API_KEY"),
            firefly_url: var("FIREFLY_III_URL").map(|url| url.trim_end_matches('/').to_string()),
            firefly_access_token: var("FIREFLY_III_ACCESS_TOKEN"),
            listen_addr,
            sync_interval,
            sync_run_on_start: parse_flag("SYNC_RUN_ON_START", var("SYNC_RUN_ON_START"))?,
            sync_lookback_days,
            sync_strict_amounts: parse_flag("SYNC_STRICT_AMOUNTS", var("SYNC_STRICT_AMOUNTS"))?,
        })
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            lookback_days: self.sync_lookback_days,
            malformed_amount_policy: if self.sync_strict_amounts {
                MalformedAmountPolicy::Reject
            } else {
                MalformedAmountPolicy::TreatAsZero
            },
            ..SyncConfig::default()
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: self.sync_interval,
            run_on_start: self.sync_run_on_start,
        }
    }
}

fn parse_flag(key: &str, value: Option<String>) -> anyhow::Result<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(anyhow!("{} must be true or false, got '{}'", key, other)),
    }
}
