//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnistorageError};

/// Environment variable holding the API root URL.
pub const URL_ENV: &str = "UNISTORAGE_URL";
/// Environment variable holding the access token.
pub const TOKEN_ENV: &str = "UNISTORAGE_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "UNISTORAGE_TIMEOUT_SECS";

const DEFAULT_URL: &str = "http://localhost:5000/";

/// Settings needed to talk to a Unistorage deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root URL (e.g. `http://localhost:5000/`).
    pub base_url: String,
    /// Access token sent in the `Token` header.
    pub token: String,
    /// Per-request timeout in milliseconds. `None` leaves requests unbounded.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            token: String::new(),
            timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with no timeout.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout_ms: None,
        }
    }

    /// Set the per-request timeout handed to the HTTP transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// The per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load from `UNISTORAGE_URL`, `UNISTORAGE_TOKEN` and `UNISTORAGE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(URL_ENV).unwrap_or_else(|| DEFAULT_URL.to_string());
        let token = lookup(TOKEN_ENV)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UnistorageError::Config(format!("Missing token. Set {TOKEN_ENV}")))?;
        let timeout_ms = match lookup(TIMEOUT_ENV) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|e| {
                    UnistorageError::Config(format!("Invalid {TIMEOUT_ENV} {raw:?}: {e}"))
                })?;
                Some(secs.saturating_mul(1000))
            }
            None => None,
        };

        Ok(Self {
            base_url,
            token,
            timeout_ms,
        })
    }
}
