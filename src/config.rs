//! Service configuration from `MARKETPLACE_*` environment variables.
//!
//! Values are trimmed and empty values count as unset. Anything set but
//! unparsable is an error rather than a silent default.

use crate::jobs::JobSettings;
use crate::refunds::RefundSettings;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

fn invalid(name: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        name,
        message: message.into(),
    }
}

/// CORS configuration for browser-based access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins. `["*"]` allows all origins; empty disables CORS.
    pub allowed_origins: Vec<String>,
    /// Max age for the preflight cache.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    /// Bearer secret for the cron endpoints. Unset disables them.
    pub cron_secret: Option<String>,
    pub cors: CorsConfig,
    pub request_timeout: Duration,
    pub store_timeout: Duration,
    pub gateway_timeout: Duration,
    pub notify_timeout: Duration,
    pub refund_claim_ttl: Duration,
    pub low_stock_threshold: u32,
    pub cart_idle: Duration,
    /// Load demo users, products and orders at startup.
    pub seed_demo: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("http_addr", &self.http_addr)
            .field("cron_secret", &self.cron_secret.as_ref().map(|_| "[REDACTED]"))
            .field("cors", &self.cors)
            .field("request_timeout", &self.request_timeout)
            .field("store_timeout", &self.store_timeout)
            .field("gateway_timeout", &self.gateway_timeout)
            .field("notify_timeout", &self.notify_timeout)
            .field("refund_claim_ttl", &self.refund_claim_ttl)
            .field("low_stock_threshold", &self.low_stock_threshold)
            .field("cart_idle", &self.cart_idle)
            .field("seed_demo", &self.seed_demo)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cron_secret: None,
            cors: CorsConfig::default(),
            request_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_millis(5000),
            gateway_timeout: Duration::from_millis(10_000),
            notify_timeout: Duration::from_millis(5000),
            refund_claim_ttl: Duration::from_secs(120),
            low_stock_threshold: 5,
            cart_idle: Duration::from_secs(24 * 3600),
            seed_demo: false,
        }
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn u64(&self, name: &'static str) -> Result<Option<u64>, ConfigError> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        v.parse::<u64>()
            .map(Some)
            .map_err(|e| invalid(name, format!("must be a non-negative integer: {e}")))
    }

    fn u32(&self, name: &'static str) -> Result<Option<u32>, ConfigError> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        v.parse::<u32>()
            .map(Some)
            .map_err(|e| invalid(name, format!("must be a non-negative integer: {e}")))
    }

    /// A strictly positive duration in the given unit.
    fn duration(
        &self,
        name: &'static str,
        unit: fn(u64) -> Duration,
    ) -> Result<Option<Duration>, ConfigError> {
        match self.u64(name)? {
            Some(0) => Err(invalid(name, "must be greater than zero")),
            Some(value) => Ok(Some(unit(value))),
            None => Ok(None),
        }
    }

    fn bool(&self, name: &'static str) -> Result<Option<bool>, ConfigError> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        parse_bool(name, &v).map(Some)
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(invalid(name, "must be a boolean (true/false/1/0)")),
    }
}

fn parse_cors_allowed_origins(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed == "*" {
        return vec!["*".to_string()];
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn hours(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(3600))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup };
        let defaults = Self::default();

        let http_addr = match vars.string("MARKETPLACE_HTTP_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| invalid("MARKETPLACE_HTTP_ADDR", e.to_string()))?,
            None => defaults.http_addr,
        };
        let cors = CorsConfig {
            allowed_origins: vars
                .string("MARKETPLACE_CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_cors_allowed_origins(&raw))
                .unwrap_or_default(),
            max_age_seconds: vars
                .u64("MARKETPLACE_CORS_MAX_AGE_SECONDS")?
                .unwrap_or(defaults.cors.max_age_seconds),
        };

        let config = Self {
            http_addr,
            cron_secret: vars.string("MARKETPLACE_CRON_SECRET"),
            cors,
            request_timeout: vars
                .duration("MARKETPLACE_REQUEST_TIMEOUT_SECS", Duration::from_secs)?
                .unwrap_or(defaults.request_timeout),
            store_timeout: vars
                .duration("MARKETPLACE_STORE_TIMEOUT_MS", Duration::from_millis)?
                .unwrap_or(defaults.store_timeout),
            gateway_timeout: vars
                .duration("MARKETPLACE_GATEWAY_TIMEOUT_MS", Duration::from_millis)?
                .unwrap_or(defaults.gateway_timeout),
            notify_timeout: vars
                .duration("MARKETPLACE_NOTIFY_TIMEOUT_MS", Duration::from_millis)?
                .unwrap_or(defaults.notify_timeout),
            refund_claim_ttl: vars
                .duration("MARKETPLACE_REFUND_CLAIM_TTL_SECS", Duration::from_secs)?
                .unwrap_or(defaults.refund_claim_ttl),
            low_stock_threshold: vars
                .u32("MARKETPLACE_LOW_STOCK_THRESHOLD")?
                .unwrap_or(defaults.low_stock_threshold),
            cart_idle: vars
                .duration("MARKETPLACE_CART_IDLE_HOURS", hours)?
                .unwrap_or(defaults.cart_idle),
            seed_demo: vars
                .bool("MARKETPLACE_SEED_DEMO")?
                .unwrap_or(defaults.seed_demo),
        };

        // An approval claim must outlive the gateway call it guards.
        if config.refund_claim_ttl <= config.gateway_timeout {
            return Err(invalid(
                "MARKETPLACE_REFUND_CLAIM_TTL_SECS",
                format!(
                    "must be longer than the gateway timeout ({}ms)",
                    config.gateway_timeout.as_millis()
                ),
            ));
        }
        Ok(config)
    }

    pub fn refund_settings(&self) -> RefundSettings {
        RefundSettings {
            gateway_timeout: self.gateway_timeout,
            claim_ttl: chrono::Duration::from_std(self.refund_claim_ttl)
                .unwrap_or_else(|_| RefundSettings::default().claim_ttl),
        }
    }

    pub fn job_settings(&self) -> JobSettings {
        JobSettings {
            low_stock_threshold: self.low_stock_threshold,
            cart_idle: chrono::Duration::from_std(self.cart_idle)
                .unwrap_or_else(|_| JobSettings::default().cart_idle),
        }
    }
}
