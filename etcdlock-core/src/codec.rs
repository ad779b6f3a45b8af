//! Key namespacing and prefix range arithmetic.
//!
//! etcd answers "does any key start with P" through a half-open range
//! `[P, end)`, so a lock's presence can be checked without listing keys.

use crate::error::{LockError, Result};

/// Range end meaning "no upper bound" in etcd's range requests.
pub const OPEN_RANGE_END: [u8; 1] = [0x00];

/// Separates a lock name from the lease suffix in ownership keys.
pub const LOCK_KEY_SEPARATOR: u8 = b'/';

/// Build the storage key for a lock name: `prefix ++ name`.
///
/// Plain concatenation. Names that themselves contain the prefix are not
/// escaped.
pub fn namespace(prefix: &[u8], name: &[u8]) -> Result<Vec<u8>> {
    if name.is_empty() {
        return Err(LockError::InvalidArgument(
            "lock name must not be empty".to_string(),
        ));
    }

    let mut key = Vec::with_capacity(prefix.len() + name.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(name);
    Ok(key)
}

/// Prefix shared by every ownership key of the lock stored at `key`:
/// `key ++ "/"`. Ranging over this instead of `key` keeps `orders` from
/// matching the keys of `orders-archive`.
pub fn owner_prefix(key: &[u8]) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(key.len() + 1);
    prefix.extend_from_slice(key);
    prefix.push(LOCK_KEY_SEPARATOR);
    prefix
}

/// Smallest byte string greater than every string that has `key` as a prefix.
///
/// Walks backwards to the last byte below `0xFF`, increments it and drops
/// everything after it. A key made only of `0xFF` bytes has no finite bound,
/// so [`OPEN_RANGE_END`] is returned instead.
pub fn prefix_range_end(key: &[u8]) -> Vec<u8> {
    match key.iter().rposition(|&b| b < u8::MAX) {
        Some(pos) => {
            let mut end = key[..=pos].to_vec();
            end[pos] += 1;
            end
        }
        None => OPEN_RANGE_END.to_vec(),
    }
}

/// True when `range_end` is the open-ended marker.
pub fn is_open_ended(range_end: &[u8]) -> bool {
    range_end == OPEN_RANGE_END
}
