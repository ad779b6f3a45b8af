use std::sync::Arc;
use std::time::{Duration, Instant};

use etcdlock_core::infrastructure_in_memory::InMemoryCoordinator;
use etcdlock_core::{LockClient, LockConfig, LockError, TlsConfig};

use crate::output::*;
use crate::ConnectionArgs;

fn read_pem(path: &str) -> Result<String, LockError> {
    std::fs::read_to_string(path)
        .map_err(|e| LockError::Config(format!("failed to read '{}': {}", path, e)))
}

pub fn build_config(args: &ConnectionArgs) -> Result<LockConfig, LockError> {
    let mut config = LockConfig::new(&args.endpoint)
        .with_key_prefix(&args.prefix)
        .with_default_timeout_ms(args.timeout_ms);

    match (&args.ca_file, &args.key_file, &args.cert_file) {
        (None, None, None) => {}
        (None, _, _) => {
            return Err(LockError::Config(
                "--key-file/--cert-file require --ca-file".to_string(),
            ));
        }
        (Some(ca), key, cert) => {
            let mut tls = TlsConfig::new(read_pem(ca)?);
            if let Some(key) = key {
                tls.private_key = Some(read_pem(key)?);
            }
            if let Some(cert) = cert {
                tls.cert_chain = Some(read_pem(cert)?);
            }
            config = config.with_tls(tls);
        }
    }

    Ok(config)
}

async fn create_client(args: &ConnectionArgs) -> Result<LockClient, LockError> {
    let config = build_config(args)?;

    if args.memory {
        tracing::warn!("Using in-process coordinator; locks are not shared with other processes");
        return LockClient::with_service(config, Arc::new(InMemoryCoordinator::new()));
    }

    connect(config).await
}

#[cfg(feature = "etcd")]
async fn connect(config: LockConfig) -> Result<LockClient, LockError> {
    LockClient::connect(config).await
}

#[cfg(not(feature = "etcd"))]
async fn connect(_config: LockConfig) -> Result<LockClient, LockError> {
    Err(LockError::Config(
        "built without etcd support; pass --memory".to_string(),
    ))
}

pub async fn lock(
    args: &ConnectionArgs,
    name: &str,
    ttl_ms: Option<u64>,
    hold_ms: Option<u64>,
) -> Result<(), LockError> {
    let client = create_client(args).await?;
    let ttl_ms = ttl_ms.unwrap_or(client.default_timeout_ms());

    tracing::info!(name, ttl_ms, "Waiting for lock");
    let handle = client.acquire_with_timeout(name, ttl_ms).await?;
    let key = display_key(handle.key());
    let acquired_at = Instant::now();

    print_json(&CliResponse::ok(AcquiredResponse {
        name: name.to_string(),
        key: key.clone(),
        ttl_ms,
    }));

    match hold_ms {
        Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C, releasing now");
            }
        }
    }

    handle.unlock().await?;
    print_json(&CliResponse::ok(ReleasedResponse {
        name: name.to_string(),
        key,
        held_ms: u64::try_from(acquired_at.elapsed().as_millis()).unwrap_or(u64::MAX),
    }));
    Ok(())
}

pub async fn status(args: &ConnectionArgs, name: &str) -> Result<(), LockError> {
    let client = create_client(args).await?;
    let snapshot = client.lock_count(name).await?;

    print_json(&CliResponse::ok(StatusResponse {
        name: name.to_string(),
        locked: snapshot.is_locked(),
        count: snapshot.count,
        range_start: display_key(&snapshot.key),
        range_end: display_key(&snapshot.range_end),
    }));
    Ok(())
}

pub async fn range(args: &ConnectionArgs, name: &str) -> Result<(), LockError> {
    let client = create_client(args).await?;
    let snapshot = client.lock_count(name).await?;

    print_json(&CliResponse::ok(RangeResponse::from_snapshot(&snapshot)));
    Ok(())
}
