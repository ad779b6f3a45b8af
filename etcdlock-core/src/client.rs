//! High-level lock client over a pluggable coordination service.
//! The CLI delegates to this; the service behind it is etcd in production
//! and [`InMemoryCoordinator`](crate::infrastructure_in_memory::InMemoryCoordinator)
//! in tests.

use std::sync::Arc;

use crate::codec;
use crate::config::LockConfig;
use crate::error::{LockError, Result};
use crate::handle::LockHandle;
use crate::infrastructure::CoordinationService;
use crate::lease::LeaseGrantor;
use crate::retry::RetryPolicy;
use crate::types::{LockKey, RangeCount};

/// Entry point for acquiring and inspecting named locks.
///
/// Cloning is cheap: clones share the service handle and configuration.
#[derive(Clone)]
pub struct LockClient {
    service: Arc<dyn CoordinationService>,
    leases: LeaseGrantor,
    retry: RetryPolicy,
    config: Arc<LockConfig>,
}

impl LockClient {
    /// Connect to etcd at `config.endpoint`.
    #[cfg(feature = "etcd")]
    pub async fn connect(config: LockConfig) -> Result<Self> {
        config.validate()?;
        let service = crate::infrastructure_etcd::EtcdCoordinator::connect(&config).await?;
        Self::with_service(config, Arc::new(service))
    }

    /// Build a client around an already constructed service.
    pub fn with_service(config: LockConfig, service: Arc<dyn CoordinationService>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            leases: LeaseGrantor::new(service.clone()),
            retry: RetryPolicy::from(&config.retry),
            service,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    pub fn default_timeout_ms(&self) -> u64 {
        self.config.default_timeout_ms
    }

    pub fn key_prefix(&self) -> &str {
        &self.config.key_prefix
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Acquire `name` with a lease of the configured default timeout.
    pub async fn acquire(&self, name: impl AsRef<[u8]>) -> Result<LockHandle> {
        self.acquire_with_timeout(name, self.config.default_timeout_ms)
            .await
    }

    /// Acquire `name`, waiting as long as the service keeps the call open.
    ///
    /// `ttl_ms` bounds the lease, not this call. Every attempt grants a fresh
    /// lease; overload rejections retry the whole attempt.
    pub async fn acquire_with_timeout(
        &self,
        name: impl AsRef<[u8]>,
        ttl_ms: u64,
    ) -> Result<LockHandle> {
        let name_key = codec::namespace(self.config.key_prefix.as_bytes(), name.as_ref())?;

        let key = self
            .retry
            .retry(LockError::is_retryable, || self.attempt(&name_key, ttl_ms))
            .await?;

        tracing::info!(
            name = %String::from_utf8_lossy(&name_key),
            key = %String::from_utf8_lossy(&key),
            ttl_ms,
            "Lock acquired"
        );
        LockHandle::new(self.clone(), key)
    }

    async fn attempt(&self, name_key: &[u8], ttl_ms: u64) -> Result<LockKey> {
        let lease = self.leases.grant(ttl_ms).await?;
        self.service.lock(name_key.to_vec(), lease).await
    }

    /// Whether any holder or waiter currently has an ownership key for `name`.
    /// Point-in-time answer, unordered with respect to concurrent calls.
    /// Locks whose names merely start with `name` are not counted.
    pub async fn is_locked(&self, name: impl AsRef<[u8]>) -> Result<bool> {
        Ok(self.lock_count(name).await?.is_locked())
    }

    /// Count ownership keys of `name` with a single count-only range request
    /// over `[prefix ++ name ++ "/", range end)`.
    pub async fn lock_count(&self, name: impl AsRef<[u8]>) -> Result<RangeCount> {
        let name_key = codec::namespace(self.config.key_prefix.as_bytes(), name.as_ref())?;
        let key = codec::owner_prefix(&name_key);
        let range_end = codec::prefix_range_end(&key);
        let count = self
            .service
            .range_count(key.clone(), range_end.clone())
            .await?;
        Ok(RangeCount {
            key,
            range_end,
            count,
        })
    }

    /// Release the ownership key. Only reachable through [`LockHandle::unlock`].
    pub(crate) async fn release(&self, key: &[u8]) -> Result<()> {
        self.service.unlock(key.to_vec()).await?;
        tracing::info!(key = %String::from_utf8_lossy(key), "Lock released");
        Ok(())
    }
}

impl std::fmt::Debug for LockClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockClient")
            .field("endpoint", &self.config.endpoint)
            .field("key_prefix", &self.config.key_prefix)
            .field("default_timeout_ms", &self.config.default_timeout_ms)
            .field("retry", &self.retry)
            .finish()
    }
}
