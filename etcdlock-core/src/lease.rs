use std::sync::Arc;

use crate::error::Result;
use crate::infrastructure::CoordinationService;
use crate::types::LeaseId;

/// Converts a millisecond timeout into the service's whole-second TTL.
pub fn ttl_seconds(ttl_ms: u64) -> i64 {
    i64::try_from(ttl_ms / 1000).unwrap_or(i64::MAX)
}

/// Requests leases that anchor a lock's automatic expiry.
#[derive(Clone)]
pub struct LeaseGrantor {
    service: Arc<dyn CoordinationService>,
}

impl LeaseGrantor {
    pub fn new(service: Arc<dyn CoordinationService>) -> Self {
        Self { service }
    }

    /// Grant a lease for `ttl_ms`, truncated to whole seconds.
    /// Errors are returned as-is; retrying is the caller's decision.
    pub async fn grant(&self, ttl_ms: u64) -> Result<LeaseId> {
        let ttl = ttl_seconds(ttl_ms);
        let lease = self.service.lease_grant(ttl).await?;
        tracing::debug!(lease_id = lease, ttl_seconds = ttl, "Lease granted");
        Ok(lease)
    }
}
