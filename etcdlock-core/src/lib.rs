//! # etcdlock-core
//!
//! Distributed mutual exclusion on top of a lease-based coordination
//! service. The service (etcd v3) decides who holds a lock; this crate
//! grants leases, issues the blocking lock call with bounded retry under
//! overload, and answers "is this name locked" with a single prefix
//! range count.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod handle;
pub mod infrastructure;
#[cfg(feature = "etcd")]
#[path = "infrastructure_etcd.rs"]
pub mod infrastructure_etcd;
#[path = "infrastructure_in_memory.rs"]
pub mod infrastructure_in_memory;
pub mod lease;
pub mod retry;
pub mod types;

pub use client::LockClient;
pub use config::{LockConfig, RetryConfig, TlsConfig};
pub use error::{LockError, Result};
pub use handle::LockHandle;

#[cfg(test)]
mod codec_test;
#[cfg(test)]
mod config_test;
