//! Snapshot cache shared by every invocation on the host.
//!
//! Collection is expensive and the monitoring agent starts many short-lived
//! processes that each want one metric, so the first process to miss collects
//! a full snapshot and the rest read it back until it expires.

use crate::snapshot::MetricSnapshot;
use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io;
use tracing::{info, warn};

pub mod file;
pub use file::FileCache;

/// How long a snapshot stays valid unless configured otherwise.
pub const DEFAULT_TTL_SECONDS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache location cannot be used at all.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize cache entry: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Source of "now", replaceable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A stored snapshot with the metadata needed to decide whether it is live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub namespace: String,
    pub payload: MetricSnapshot,
    pub created_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl CacheEntry {
    #[must_use]
    pub fn new(
        namespace: &str,
        payload: MetricSnapshot,
        created_at: DateTime<Utc>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            namespace: namespace.to_string(),
            payload,
            created_at,
            ttl_seconds,
        }
    }

    /// Live while `0 <= now - created_at <= ttl`. Entries from the future
    /// (clock moved backwards) are not trusted.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        let ttl = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);

        age >= TimeDelta::zero() && age <= ttl
    }
}

/// Namespace-scoped snapshot storage.
pub trait SnapshotCache {
    /// The live snapshot for `namespace`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Unavailable`] when the cache cannot be read at
    /// all. Missing, expired or corrupt entries are `Ok(None)`.
    fn get(&self, namespace: &str) -> Result<Option<MetricSnapshot>, CacheError>;

    /// Store `snapshot` for `namespace`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn put(
        &self,
        namespace: &str,
        snapshot: &MetricSnapshot,
        ttl_seconds: u64,
    ) -> Result<(), CacheError>;
}

/// Serve `namespace` from the cache, collecting and storing a fresh snapshot
/// on a miss.
///
/// `collect` runs at most once and only on a miss. Failing to store the
/// fresh snapshot does not fail the call.
///
/// # Errors
///
/// Returns an error if the cache is unavailable or `collect` fails.
pub async fn load_or_collect<C, F, Fut>(
    cache: &C,
    namespace: &str,
    ttl_seconds: u64,
    collect: F,
) -> Result<MetricSnapshot>
where
    C: SnapshotCache + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<MetricSnapshot>>,
{
    match cache.get(namespace) {
        Ok(Some(snapshot)) => {
            info!(namespace, metrics = snapshot.len(), "snapshot cache hit");
            return Ok(snapshot);
        }
        Ok(None) => info!(namespace, "snapshot cache miss"),
        Err(e @ CacheError::Unavailable(_)) => {
            return Err(e).context("snapshot cache is unavailable");
        }
        Err(e) => warn!(namespace, error = %e, "failed to read snapshot cache, collecting"),
    }

    let snapshot = collect().await?;

    if let Err(e) = cache.put(namespace, &snapshot, ttl_seconds) {
        warn!(namespace, error = %e, "failed to store snapshot");
    }

    Ok(snapshot)
}
