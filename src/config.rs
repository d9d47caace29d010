//! Runtime configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! # Environment Variables
//!
//! - `LIVE_CHECKOUT_CHANNEL_BUFFER` - Request queue capacity of each table (default: 32)
//! - `LIVE_CHECKOUT_SAVE_DEBOUNCE_MS` - Idle delay before a checkout edit is saved (default: 500)
//! - `LIVE_CHECKOUT_DEFAULT_CODE` - Code given to a captured line typed without one (default: JP)
//! - `LIVE_CHECKOUT_ORDER_PREFIX` - Prefix of generated order numbers (default: CMD)
//! - `LIVE_CHECKOUT_LOG` - Log filter used when `RUST_LOG` is unset (default: info)

use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CHANNEL_BUFFER: usize = 32;
const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;
const DEFAULT_CODE: &str = "JP";
const DEFAULT_ORDER_PREFIX: &str = "CMD";
const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutConfig {
    /// Capacity of every table's request channel
    pub channel_buffer: usize,
    /// How long the checkout form waits after the last keystroke before saving
    pub save_debounce: Duration,
    pub default_code: String,
    pub order_prefix: String,
    pub log_filter: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
            save_debounce: Duration::from_millis(DEFAULT_SAVE_DEBOUNCE_MS),
            default_code: DEFAULT_CODE.to_string(),
            order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any name-to-value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let channel_buffer: usize = parse_or_default(
            &lookup,
            "LIVE_CHECKOUT_CHANNEL_BUFFER",
            DEFAULT_CHANNEL_BUFFER,
        )?;
        if channel_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "LIVE_CHECKOUT_CHANNEL_BUFFER".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let debounce_ms = parse_or_default(
            &lookup,
            "LIVE_CHECKOUT_SAVE_DEBOUNCE_MS",
            DEFAULT_SAVE_DEBOUNCE_MS,
        )?;

        Ok(Self {
            channel_buffer,
            save_debounce: Duration::from_millis(debounce_ms),
            default_code: non_blank_or_default(&lookup, "LIVE_CHECKOUT_DEFAULT_CODE", DEFAULT_CODE),
            order_prefix: non_blank_or_default(
                &lookup,
                "LIVE_CHECKOUT_ORDER_PREFIX",
                DEFAULT_ORDER_PREFIX,
            ),
            log_filter: non_blank_or_default(&lookup, "LIVE_CHECKOUT_LOG", DEFAULT_LOG_FILTER),
        })
    }
}

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

fn non_blank_or_default(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> String {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CheckoutConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CheckoutConfig::default());
        assert_eq!(config.save_debounce, Duration::from_millis(500));
        assert_eq!(config.default_code, "JP");
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = CheckoutConfig::from_lookup(lookup(&[
            ("LIVE_CHECKOUT_CHANNEL_BUFFER", "8"),
            ("LIVE_CHECKOUT_SAVE_DEBOUNCE_MS", " 250 "),
            ("LIVE_CHECKOUT_DEFAULT_CODE", "  "),
            ("LIVE_CHECKOUT_ORDER_PREFIX", "LIVE"),
        ]))
        .unwrap();
        assert_eq!(config.channel_buffer, 8);
        assert_eq!(config.save_debounce, Duration::from_millis(250));
        assert_eq!(config.default_code, "JP");
        assert_eq!(config.order_prefix, "LIVE");
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = CheckoutConfig::from_lookup(lookup(&[("LIVE_CHECKOUT_SAVE_DEBOUNCE_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(name, _) if name == "LIVE_CHECKOUT_SAVE_DEBOUNCE_MS"));

        let zero = CheckoutConfig::from_lookup(lookup(&[("LIVE_CHECKOUT_CHANNEL_BUFFER", "0")]));
        assert!(zero.is_err());
    }
}
