//! etcd-backed CoordinationService.
//!
//! Enable with the `etcd` feature flag (on by default):
//! ```toml
//! etcdlock-core = { path = "../etcdlock-core", features = ["etcd"] }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use etcd_client::{
    Certificate, Client, ConnectOptions, GetOptions, Identity, LockOptions, TlsOptions,
};
use tonic::Code;

use crate::config::LockConfig;
use crate::error::{LockError, Result};
use crate::infrastructure::CoordinationService;
use crate::types::{LeaseId, LockKey};

/// Message etcd attaches to admission-control rejections.
const TOO_MANY_REQUESTS: &str = "too many requests";

/// Map a gRPC status to the client's error kinds.
///
/// The status code is authoritative; the message is only consulted for
/// servers that report overload under a different code.
pub fn classify_status(code: Code, message: &str) -> LockError {
    if code == Code::ResourceExhausted || message.contains(TOO_MANY_REQUESTS) {
        LockError::TransientOverload(message.to_string())
    } else {
        LockError::Service(format!("{code:?}: {message}"))
    }
}

impl From<etcd_client::Error> for LockError {
    fn from(err: etcd_client::Error) -> Self {
        match err {
            etcd_client::Error::GRpcStatus(status) => {
                classify_status(status.code(), status.message())
            }
            other => LockError::Service(other.to_string()),
        }
    }
}

/// Talks to etcd's Lease, Lock and KV services over one shared channel.
pub struct EtcdCoordinator {
    client: Client,
}

impl EtcdCoordinator {
    pub async fn connect(config: &LockConfig) -> Result<Self> {
        let mut options = ConnectOptions::new();
        if let Some(ms) = config.connect_timeout_ms {
            options = options.with_connect_timeout(Duration::from_millis(ms));
        }

        match &config.tls {
            Some(tls) => {
                let mut tls_options =
                    TlsOptions::new().ca_certificate(Certificate::from_pem(&tls.root_cert));
                if let Some((key, chain)) = tls.identity() {
                    tls_options = tls_options.identity(Identity::from_pem(chain, key));
                }
                options = options.with_tls(tls_options);
                tracing::debug!(endpoint = %config.endpoint, "Using TLS channel");
            }
            None => {
                tracing::debug!(endpoint = %config.endpoint, "Using insecure channel");
            }
        }

        let client = Client::connect([config.endpoint.as_str()], Some(options)).await?;
        tracing::info!(endpoint = %config.endpoint, "Connected to etcd");
        Ok(Self::from_client(client))
    }

    /// Wrap an already connected client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CoordinationService for EtcdCoordinator {
    async fn lease_grant(&self, ttl_seconds: i64) -> Result<LeaseId> {
        // Client clones share the underlying channel.
        let mut client = self.client.clone();
        let resp = client.lease_grant(ttl_seconds, None).await?;
        Ok(resp.id())
    }

    async fn lock(&self, name: Vec<u8>, lease: LeaseId) -> Result<LockKey> {
        let mut client = self.client.clone();
        let resp = client
            .lock(name, Some(LockOptions::new().with_lease(lease)))
            .await?;
        Ok(resp.key().to_vec())
    }

    async fn unlock(&self, key: LockKey) -> Result<()> {
        let mut client = self.client.clone();
        client.unlock(key).await?;
        Ok(())
    }

    async fn range_count(&self, key: Vec<u8>, range_end: Vec<u8>) -> Result<i64> {
        let mut client = self.client.clone();
        let options = GetOptions::new().with_range(range_end).with_count_only();
        let resp = client.get(key, Some(options)).await?;
        Ok(resp.count())
    }
}
