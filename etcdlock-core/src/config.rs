//! Client configuration.
//!
//! Read once when a [`LockClient`](crate::client::LockClient) is built and
//! never re-validated afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{LockError, Result};

pub const DEFAULT_ENDPOINT: &str = "127.0.0.1:2379";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_KEY_PREFIX: &str = "etcdlock/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Coordination service address, `host:port` or a full URL
    pub endpoint: String,
    /// Lease TTL used by `acquire` when no explicit timeout is given
    pub default_timeout_ms: u64,
    /// Prepended to every lock name
    pub key_prefix: String,
    /// Channel connect timeout; the transport default applies when unset
    pub connect_timeout_ms: Option<u64>,
    /// TLS material; an insecure channel is used when absent
    pub tls: Option<TlsConfig>,
    pub retry: RetryConfig,
}

/// PEM encoded transport security material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    pub root_cert: String,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub cert_chain: Option<String>,
}

impl TlsConfig {
    pub fn new(root_cert: impl Into<String>) -> Self {
        Self {
            root_cert: root_cert.into(),
            private_key: None,
            cert_chain: None,
        }
    }

    /// Attach a client identity (mutual TLS).
    pub fn with_identity(
        mut self,
        private_key: impl Into<String>,
        cert_chain: impl Into<String>,
    ) -> Self {
        self.private_key = Some(private_key.into());
        self.cert_chain = Some(cert_chain.into());
        self
    }

    /// Key and chain, if both are configured.
    pub fn identity(&self) -> Option<(&str, &str)> {
        match (&self.private_key, &self.cert_chain) {
            (Some(key), Some(chain)) => Some((key.as_str(), chain.as_str())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff_step_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_step_ms: 500,
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            connect_timeout_ms: None,
            tls: None,
            retry: RetryConfig::default(),
        }
    }
}

impl LockConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_retry(mut self, max_retries: u32, backoff_step_ms: u64) -> Self {
        self.retry = RetryConfig {
            max_retries,
            backoff_step_ms,
        };
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(LockError::Config("endpoint is required".to_string()));
        }
        if self.default_timeout_ms == 0 {
            return Err(LockError::Config(
                "default_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.retry.backoff_step_ms == 0 {
            return Err(LockError::Config(
                "retry.backoff_step_ms must be greater than 0".to_string(),
            ));
        }
        if let Some(tls) = &self.tls {
            if tls.root_cert.trim().is_empty() {
                return Err(LockError::Config("tls.root_cert is empty".to_string()));
            }
            if tls.private_key.is_some() != tls.cert_chain.is_some() {
                return Err(LockError::Config(
                    "tls.private_key and tls.cert_chain must be set together".to_string(),
                ));
            }
        }
        Ok(())
    }
}
