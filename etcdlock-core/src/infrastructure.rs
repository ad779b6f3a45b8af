use async_trait::async_trait;

use crate::error::Result;
use crate::types::{LeaseId, LockKey};

/// The four call groups the lock client needs from the coordination service.
///
/// Implementations own transport, storage and lease expiry. They must be
/// safe to share across tasks without extra locking on the caller side.
#[async_trait]
pub trait CoordinationService: Send + Sync {
    /// Grant a lease living `ttl_seconds`.
    async fn lease_grant(&self, ttl_seconds: i64) -> Result<LeaseId>;

    /// Take the lock `name` on behalf of `lease`.
    ///
    /// Blocks until every earlier holder or waiter on `name` is gone, or
    /// until `lease` expires. Returns the key that represents ownership.
    async fn lock(&self, name: Vec<u8>, lease: LeaseId) -> Result<LockKey>;

    /// Delete the ownership key returned by [`CoordinationService::lock`].
    async fn unlock(&self, key: LockKey) -> Result<()>;

    /// Count keys in `[key, range_end)` without fetching them.
    async fn range_count(&self, key: Vec<u8>, range_end: Vec<u8>) -> Result<i64>;
}
