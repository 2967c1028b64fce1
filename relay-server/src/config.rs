//! Configuration module for environment variable parsing.
//!
//! Everything has a default, so the relay starts with no environment at all
//! and forwards to the production webhook.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Downstream webhook the relay forwards to unless `RELAY_WEBHOOK_URL` is set.
pub const DEFAULT_WEBHOOK_URL: &str = "https://hook.eu2.make.com/ucqur41zxfss6x9kmziwtuohwoysg96o";

/// Inbound body cap, matching the request size limit of the platform the
/// relay was first deployed on.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid webhook url {value:?}: {source}")]
    InvalidWebhookUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("webhook url {0:?} must use http or https")]
    UnsupportedScheme(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Downstream webhook every POST body is forwarded to
    pub webhook_url: Url,

    /// Outbound request timeout. `None` leaves the HTTP client default in place.
    pub forward_timeout: Option<Duration>,

    /// Maximum accepted inbound body size in bytes
    pub body_limit_bytes: usize,
}

impl Config {
    /// Build a configuration around a downstream URL, with every other
    /// setting at its default.
    pub fn new(webhook_url: Url) -> Self {
        Config {
            port: 8080,
            webhook_url,
            forward_timeout: None,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let webhook_url = parse_webhook_url(
            &env::var("RELAY_WEBHOOK_URL").unwrap_or_else(|_| DEFAULT_WEBHOOK_URL.to_string()),
        )?;

        Ok(Config {
            port: parse_number("PORT").unwrap_or(8080),

            webhook_url,

            forward_timeout: parse_number::<u64>("RELAY_TIMEOUT_MS").map(Duration::from_millis),

            body_limit_bytes: parse_number("RELAY_BODY_LIMIT_BYTES")
                .unwrap_or(DEFAULT_BODY_LIMIT_BYTES),
        })
    }
}

/// Parse and validate the downstream webhook URL.
pub fn parse_webhook_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidWebhookUrl {
        value: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
    }
}

/// Read a numeric environment variable. Unset yields `None` silently,
/// garbage yields `None` with a warning.
fn parse_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            None
        }
    }
}
