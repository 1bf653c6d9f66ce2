//! Site configuration.
//!
//! Settings come from JSON (for embedding in the page) or from `SOIREE_*`
//! environment variables (for server renders). Every field has a default,
//! and a missing or invalid value falls back to it with a log line rather
//! than an error.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{info, warn};

use crate::currency::CurrencyFormatter;
use crate::error::UiError;

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_CURRENCY: &str = "PHP";
/// Only the newest toast is shown.
pub const DEFAULT_TOAST_LIMIT: usize = 1;
/// Dismissed toasts linger this long before removal.
pub const DEFAULT_TOAST_REMOVE_DELAY_MS: u64 = 1_000_000;
pub const DEFAULT_STORAGE_NAMESPACE: &str = "soiree";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub locale: String,
    pub currency_code: String,
    pub toast_limit: usize,
    pub toast_remove_delay_ms: u64,
    pub storage_namespace: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            currency_code: DEFAULT_CURRENCY.to_string(),
            toast_limit: DEFAULT_TOAST_LIMIT,
            toast_remove_delay_ms: DEFAULT_TOAST_REMOVE_DELAY_MS,
            storage_namespace: DEFAULT_STORAGE_NAMESPACE.to_string(),
        }
    }
}

impl SiteConfig {
    /// Parse a JSON object; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, UiError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| UiError::Config(e.to_string()))?;
        config.validate()
    }

    /// Read `SOIREE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any variable source; `from_env` uses the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let config = Self {
            locale: try_load(&lookup, "SOIREE_LOCALE", defaults.locale),
            currency_code: try_load(&lookup, "SOIREE_CURRENCY", defaults.currency_code),
            toast_limit: try_load(&lookup, "SOIREE_TOAST_LIMIT", defaults.toast_limit),
            toast_remove_delay_ms: try_load(
                &lookup,
                "SOIREE_TOAST_REMOVE_DELAY_MS",
                defaults.toast_remove_delay_ms,
            ),
            storage_namespace: try_load(
                &lookup,
                "SOIREE_STORAGE_NAMESPACE",
                defaults.storage_namespace,
            ),
        };
        config.validate().unwrap_or_else(|e| {
            warn!("{e}; using defaults");
            Self::default()
        })
    }

    fn validate(self) -> Result<Self, UiError> {
        if self.toast_limit == 0 {
            return Err(UiError::Config("toastLimit must be at least 1".into()));
        }
        if self.currency_code.trim().is_empty() {
            return Err(UiError::Config("currencyCode must not be empty".into()));
        }
        Ok(self)
    }

    /// A formatter for the configured locale and currency.
    pub fn currency_formatter(&self) -> CurrencyFormatter {
        CurrencyFormatter::new(&self.locale, &self.currency_code)
    }
}

fn try_load<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}; using default: {default}");
        default
    })
}
