//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `FUNCTIONS_URL` - Base URL of the remote functions (`reserve-stock`,
//!   `netopia-payment`)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `FUNCTIONS_API_KEY` - Bearer key sent to the remote functions
//! - `HTTP_TIMEOUT_SECS` - Remote function timeout (default: 15)
//! - `SHIPPING_FLAT_FEE` - Shipping fee in bani (default: 2500)
//! - `FREE_SHIPPING_THRESHOLD` - Subtotal in bani above which shipping is
//!   free (default: 50000)
//! - `VAT_PERCENT` - VAT rate (default: 19)
//! - `EVENT_POLL_INTERVAL_MS` - Event log poll interval (default: 1000)
//! - `EVENT_BUS_CAPACITY` - Events a slow subscriber may lag (default: 1024)

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::pricing::PricingPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(String),
    #[error("Invalid environment variable {0}: {1}")]
    Invalid(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub functions_url: String,
    pub functions_api_key: Option<String>,
    pub http_timeout: Duration,
    pub pricing: PricingPolicy,
    pub event_poll_interval: Duration,
    pub event_bus_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let defaults = PricingPolicy::default();

        let functions_url = env.required("FUNCTIONS_URL")?;
        if !functions_url.starts_with("http://") && !functions_url.starts_with("https://") {
            return Err(ConfigError::Invalid(
                "FUNCTIONS_URL".to_string(),
                "must be an http(s) URL".to_string(),
            ));
        }

        let vat_percent: i64 = env.parsed("VAT_PERCENT", defaults.vat_percent)?;
        if !(0..=100).contains(&vat_percent) {
            return Err(ConfigError::Invalid(
                "VAT_PERCENT".to_string(),
                "must be between 0 and 100".to_string(),
            ));
        }

        let event_poll_interval_ms: u64 = env.parsed("EVENT_POLL_INTERVAL_MS", 1000)?;
        if event_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "EVENT_POLL_INTERVAL_MS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }
        let event_bus_capacity: usize = env.parsed("EVENT_BUS_CAPACITY", 1024)?;
        if event_bus_capacity == 0 {
            return Err(ConfigError::Invalid(
                "EVENT_BUS_CAPACITY".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            host: env.optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env.parsed("PORT", 8080)?,
            functions_url,
            functions_api_key: env.optional("FUNCTIONS_API_KEY"),
            http_timeout: Duration::from_secs(env.parsed("HTTP_TIMEOUT_SECS", 15)?),
            pricing: PricingPolicy {
                vat_percent,
                free_shipping_threshold: env
                    .parsed("FREE_SHIPPING_THRESHOLD", defaults.free_shipping_threshold)?,
                flat_shipping_fee: env.parsed("SHIPPING_FLAT_FEE", defaults.flat_shipping_fee)?,
            },
            event_poll_interval: Duration::from_millis(event_poll_interval_ms),
            event_bus_capacity,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Present and non-blank.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            None => Ok(default),
            Some(raw) => raw
                .parse()
                .map_err(|e: T::Err| ConfigError::Invalid(key.to_string(), e.to_string())),
        }
    }
}
