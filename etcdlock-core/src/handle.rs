use crate::client::LockClient;
use crate::error::{LockError, Result};
use crate::types::LockKey;

/// A held lock.
///
/// Dropping the handle does not release anything; the lock then lives until
/// its lease expires.
#[must_use = "dropping a LockHandle keeps the lock held until its lease expires"]
pub struct LockHandle {
    client: LockClient,
    key: LockKey,
}

impl LockHandle {
    pub(crate) fn new(client: LockClient, key: LockKey) -> Result<Self> {
        if key.is_empty() {
            return Err(LockError::InvalidArgument("empty lock key".to_string()));
        }
        Ok(Self { client, key })
    }

    /// Ownership key as returned by the service. Release addresses this key,
    /// which may differ from the namespaced lock name.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Release the lock. Consumes the handle, so a handle unlocks at most once.
    pub async fn unlock(self) -> Result<()> {
        self.client.release(&self.key).await
    }
}

impl std::fmt::Debug for LockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockHandle")
            .field("key", &String::from_utf8_lossy(&self.key))
            .finish()
    }
}
