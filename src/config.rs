//! Runtime settings stored in the `app_config` table.
//!
//! Command-line flags override these; unset keys fall back to defaults.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::report::baseline::{BaselineProvider, FlatBaseline, SyntheticBaseline};
use crate::storage::{repository, Database};

pub const KEY_QUERY_TIMEOUT_MS: &str = "query_timeout_ms";
pub const KEY_BASELINE_POLICY: &str = "baseline_policy";
pub const KEY_BASELINE_SPREAD: &str = "baseline_spread";
pub const KEY_BIND_ADDR: &str = "bind_addr";

pub const KNOWN_KEYS: [&str; 4] = [
    KEY_QUERY_TIMEOUT_MS,
    KEY_BASELINE_POLICY,
    KEY_BASELINE_SPREAD,
    KEY_BIND_ADDR,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselinePolicy {
    #[default]
    Flat,
    Synthetic,
}

impl BaselinePolicy {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(Self::Flat),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(Error::Config(format!(
                "unknown baseline policy '{other}' (expected flat or synthetic)"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Synthetic => "synthetic",
        }
    }

    pub fn provider(self, spread: f64) -> Arc<dyn BaselineProvider> {
        match self {
            Self::Flat => Arc::new(FlatBaseline),
            Self::Synthetic => Arc::new(SyntheticBaseline::new(spread)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub query_timeout_ms: u64,
    pub baseline_policy: BaselinePolicy,
    pub baseline_spread: f64,
    pub bind_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            query_timeout_ms: 5000,
            baseline_policy: BaselinePolicy::Flat,
            baseline_spread: 10.0,
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Settings {
    /// Read settings from `app_config`, defaulting any key that is not set.
    pub async fn load(db: &Database) -> Result<Self> {
        let entries = db.reader().call(|conn| repository::list_config(conn)).await?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let mut settings = Self::default();
        for (key, value) in entries {
            settings.apply(&key, &value)?;
        }
        Ok(settings)
    }

    /// Check a value before it is stored. Keys this crate does not read pass through.
    pub fn validate(key: &str, value: &str) -> Result<()> {
        Self::default().apply(key, value)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            KEY_QUERY_TIMEOUT_MS => {
                self.query_timeout_ms = match value.trim().parse::<u64>() {
                    Ok(ms) if ms > 0 => ms,
                    _ => {
                        return Err(Error::Config(format!(
                            "{key} must be a positive integer, got '{value}'"
                        )))
                    }
                };
            }
            KEY_BASELINE_POLICY => self.baseline_policy = BaselinePolicy::parse(value)?,
            KEY_BASELINE_SPREAD => {
                self.baseline_spread = match value.trim().parse::<f64>() {
                    Ok(spread) if spread.is_finite() && (0.0..=100.0).contains(&spread) => spread,
                    _ => {
                        return Err(Error::Config(format!(
                            "{key} must be a number between 0 and 100, got '{value}'"
                        )))
                    }
                };
            }
            KEY_BIND_ADDR => {
                if value.trim().is_empty() {
                    return Err(Error::Config(format!("{key} must not be empty")));
                }
                self.bind_addr = value.trim().to_string();
            }
            other => log::debug!("ignoring unrecognized config key '{other}'"),
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn baseline(&self) -> Arc<dyn BaselineProvider> {
        self.baseline_policy.provider(self.baseline_spread)
    }
}
