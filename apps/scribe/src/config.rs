use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::sync::SyncConfig;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Debounce window for Rich edits before they commit.
    pub sync_debounce: Duration,
    /// Debounce window for pushing Raw edits into the Rich surface.
    pub raw_sync_debounce: Duration,
    /// How often the sync pump checks for due propagations.
    pub sync_pump_interval: Duration,
    /// Sessions untouched for this long are flushed and dropped by the pump.
    pub session_idle_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            sync_debounce: Duration::from_millis(parse_or(&lookup, "SYNC_DEBOUNCE_MS", 400)?),
            raw_sync_debounce: Duration::from_millis(parse_or(
                &lookup,
                "RAW_SYNC_DEBOUNCE_MS",
                400,
            )?),
            sync_pump_interval: Duration::from_millis(parse_or(
                &lookup,
                "SYNC_PUMP_INTERVAL_MS",
                50,
            )?),
            session_idle_ttl: Duration::from_secs(parse_or(
                &lookup,
                "SESSION_IDLE_TTL_SECS",
                3600,
            )?),
        })
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            rich_commit_delay: self.sync_debounce,
            raw_push_delay: self.raw_sync_debounce,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
