use serde::{Deserialize, Serialize};

/// Lease identifier assigned by the coordination service.
pub type LeaseId = i64;

/// Opaque key returned by the service when a lock is granted.
/// Usually the namespaced name followed by `/` and the lease id in hex.
pub type LockKey = Vec<u8>;

/// Point-in-time result of a count-only prefix range query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeCount {
    /// Ownership-key prefix (`name/`) the range starts at
    pub key: Vec<u8>,
    /// Exclusive range end (`[0x00]` when open-ended)
    pub range_end: Vec<u8>,
    /// Number of keys currently inside the range
    pub count: i64,
}

impl RangeCount {
    pub fn is_locked(&self) -> bool {
        self.count > 0
    }
}
