//! In-process coordination service.
//!
//! Mirrors the etcd v3lock behaviour the client relies on: a lock request
//! writes `name/<lease hex>` immediately and then waits until no key under
//! `name/` has a lower revision. Waiters are therefore served in request
//! order. Keys disappear with their lease.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::codec;
use crate::error::{LockError, Result};
use crate::infrastructure::CoordinationService;
use crate::types::{LeaseId, LockKey};

/// Shortest lease the store hands out, in seconds.
pub const MIN_TTL_SECONDS: i64 = 1;

#[derive(Debug, Clone, Copy)]
struct KeyEntry {
    lease: LeaseId,
    revision: u64,
}

#[derive(Default)]
struct StoreState {
    // Lease ID -> expiry
    leases: HashMap<LeaseId, Instant>,
    keys: BTreeMap<Vec<u8>, KeyEntry>,
    next_lease: LeaseId,
    revision: u64,
    lease_faults: VecDeque<LockError>,
    lock_faults: VecDeque<LockError>,
}

impl StoreState {
    /// Drop expired leases and the keys bound to them.
    fn evict_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<LeaseId> = self
            .leases
            .iter()
            .filter(|(_, expires_at)| **expires_at <= now)
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            self.leases.remove(id);
        }
        if !expired.is_empty() {
            self.keys.retain(|_, entry| !expired.contains(&entry.lease));
        }
        expired.len()
    }

    fn count(&self, key: &[u8], range_end: &[u8]) -> i64 {
        let count = if codec::is_open_ended(range_end) {
            self.keys
                .range::<[u8], _>((Bound::Included(key), Bound::Unbounded))
                .count()
        } else if range_end <= key {
            0
        } else {
            self.keys
                .range::<[u8], _>((Bound::Included(key), Bound::Excluded(range_end)))
                .count()
        };
        count as i64
    }
}

/// Number of calls received per call group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStats {
    pub lease_grants: usize,
    pub locks: usize,
    pub unlocks: usize,
    pub range_counts: usize,
}

impl CallStats {
    pub fn total(&self) -> usize {
        self.lease_grants + self.locks + self.unlocks + self.range_counts
    }
}

#[derive(Default)]
struct Counters {
    lease_grants: AtomicUsize,
    locks: AtomicUsize,
    unlocks: AtomicUsize,
    range_counts: AtomicUsize,
}

pub struct InMemoryCoordinator {
    state: Mutex<StoreState>,
    changed: Notify,
    counters: Counters,
}

impl InMemoryCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                next_lease: 0x694d_0000,
                ..StoreState::default()
            }),
            changed: Notify::new(),
            counters: Counters::default(),
        }
    }

    /// Fail the next lease grants with the given errors, in order.
    pub fn push_lease_faults(&self, faults: impl IntoIterator<Item = LockError>) {
        self.state.lock().lease_faults.extend(faults);
    }

    /// Fail the next lock requests with the given errors, in order.
    pub fn push_lock_faults(&self, faults: impl IntoIterator<Item = LockError>) {
        self.state.lock().lock_faults.extend(faults);
    }

    pub fn stats(&self) -> CallStats {
        CallStats {
            lease_grants: self.counters.lease_grants.load(Ordering::SeqCst),
            locks: self.counters.locks.load(Ordering::SeqCst),
            unlocks: self.counters.unlocks.load(Ordering::SeqCst),
            range_counts: self.counters.range_counts.load(Ordering::SeqCst),
        }
    }

    /// Revoke a lease early, deleting every key bound to it.
    pub fn revoke(&self, lease: LeaseId) -> bool {
        let removed = {
            let mut state = self.state.lock();
            let removed = state.leases.remove(&lease).is_some();
            state.keys.retain(|_, entry| entry.lease != lease);
            removed
        };
        self.changed.notify_waiters();
        removed
    }

    /// Evict expired leases. Returns the number of leases evicted.
    pub fn evict_expired(&self) -> usize {
        let evicted = self.state.lock().evict_expired(Instant::now());
        if evicted > 0 {
            self.changed.notify_waiters();
        }
        evicted
    }

    pub fn active_leases(&self) -> usize {
        let mut state = self.state.lock();
        state.evict_expired(Instant::now());
        state.leases.len()
    }

    /// Snapshot of all live keys, in key order.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let mut state = self.state.lock();
        state.evict_expired(Instant::now());
        state.keys.keys().cloned().collect()
    }

    /// One pass over a waiter's position: `None` once it owns the lock,
    /// otherwise the instant at which the next relevant lease runs out.
    fn poll_owner(&self, name_prefix: &[u8], key: &[u8]) -> Result<Option<Instant>> {
        let mut state = self.state.lock();
        let now = Instant::now();
        if state.evict_expired(now) > 0 {
            self.changed.notify_waiters();
        }

        let Some(mine) = state.keys.get(key).copied() else {
            return Err(LockError::Service(
                "lease expired before the lock was acquired".to_string(),
            ));
        };

        let range_end = codec::prefix_range_end(name_prefix);
        let upper = if codec::is_open_ended(&range_end) {
            Bound::Unbounded
        } else {
            Bound::Excluded(range_end.as_slice())
        };

        let blockers = state
            .keys
            .range::<[u8], _>((Bound::Included(name_prefix), upper))
            .filter(|(_, entry)| entry.revision < mine.revision)
            .map(|(_, entry)| entry.lease);

        let mut wake_at: Option<Instant> = None;
        for lease in blockers {
            if let Some(expires_at) = state.leases.get(&lease) {
                wake_at = Some(wake_at.map_or(*expires_at, |at| at.min(*expires_at)));
            }
        }

        match wake_at {
            None => Ok(None),
            Some(at) => {
                let own_expiry = state.leases.get(&mine.lease).copied().unwrap_or(now);
                Ok(Some(at.min(own_expiry)))
            }
        }
    }
}

impl Default for InMemoryCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoordinationService for InMemoryCoordinator {
    async fn lease_grant(&self, ttl_seconds: i64) -> Result<LeaseId> {
        self.counters.lease_grants.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(fault) = state.lease_faults.pop_front() {
            return Err(fault);
        }

        let ttl = ttl_seconds.max(MIN_TTL_SECONDS) as u64;
        state.next_lease += 1;
        let id = state.next_lease;
        state
            .leases
            .insert(id, Instant::now() + Duration::from_secs(ttl));
        Ok(id)
    }

    async fn lock(&self, name: Vec<u8>, lease: LeaseId) -> Result<LockKey> {
        self.counters.locks.fetch_add(1, Ordering::SeqCst);

        let name_prefix = codec::owner_prefix(&name);
        let mut key = name_prefix.clone();
        key.extend_from_slice(format!("{lease:x}").as_bytes());

        {
            let mut state = self.state.lock();
            if let Some(fault) = state.lock_faults.pop_front() {
                return Err(fault);
            }
            state.evict_expired(Instant::now());
            if !state.leases.contains_key(&lease) {
                return Err(LockError::Service(format!(
                    "requested lease not found: {lease:x}"
                )));
            }
            // An existing key for this lease keeps its place in line.
            if !state.keys.contains_key(&key) {
                state.revision += 1;
                let revision = state.revision;
                state.keys.insert(key.clone(), KeyEntry { lease, revision });
            }
        }

        loop {
            // Registered before inspecting state so a concurrent unlock is not missed.
            let changed = self.changed.notified();
            match self.poll_owner(&name_prefix, &key)? {
                None => return Ok(key),
                Some(wake_at) => {
                    tokio::select! {
                        _ = changed => {}
                        _ = tokio::time::sleep_until(wake_at) => {}
                    }
                }
            }
        }
    }

    async fn unlock(&self, key: LockKey) -> Result<()> {
        self.counters.unlocks.fetch_add(1, Ordering::SeqCst);
        let removed = self.state.lock().keys.remove(&key).is_some();
        if removed {
            self.changed.notify_waiters();
        }
        Ok(())
    }

    async fn range_count(&self, key: Vec<u8>, range_end: Vec<u8>) -> Result<i64> {
        self.counters.range_counts.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        state.evict_expired(Instant::now());
        Ok(state.count(&key, &range_end))
    }
}
