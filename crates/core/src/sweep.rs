//! Activation sweep.
//!
//! Deletes expired entries from the active bucket and removes every bucket of
//! another generation wholesale. The pass is best-effort: a failed step is
//! logged, counted and skipped.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cache::{CacheBucket, CacheStorage};
use crate::freshness::is_active;

/// Outcome of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SweepReport {
    /// Bucket that was kept.
    pub active_bucket: String,
    /// Expired entries deleted from the active bucket.
    pub entries_removed: u64,
    /// Buckets of other generations that were deleted.
    pub buckets_removed: Vec<String>,
    /// Operations that failed and were skipped.
    pub failures: u64,
}

/// Sweep `storage`, keeping only the unexpired entries of `active_bucket`.
///
/// Freshness is evaluated against the single instant `now_ms`.
///
/// # Errors
///
/// Returns an error only if the bucket names cannot be listed.
pub async fn sweep<S: CacheStorage>(storage: &S, active_bucket: &str, now_ms: i64) -> Result<SweepReport, Error> {
    let names = storage.bucket_names().await?;
    let mut report = SweepReport { active_bucket: active_bucket.to_string(), ..Default::default() };

    for name in names {
        if name == active_bucket {
            sweep_active(storage, &name, now_ms, &mut report).await;
            continue;
        }

        match storage.delete_bucket(&name).await {
            Ok(true) => {
                tracing::debug!(bucket = %name, "deleted stale generation");
                report.buckets_removed.push(name);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(bucket = %name, "failed to delete stale bucket: {}", e);
                report.failures += 1;
            }
        }
    }

    tracing::info!(
        bucket = %report.active_bucket,
        entries_removed = report.entries_removed,
        buckets_removed = report.buckets_removed.len(),
        failures = report.failures,
        "sweep finished"
    );

    Ok(report)
}

async fn sweep_active<S: CacheStorage>(storage: &S, name: &str, now_ms: i64, report: &mut SweepReport) {
    let bucket = match storage.open(name).await {
        Ok(bucket) => bucket,
        Err(e) => {
            tracing::warn!(bucket = %name, "failed to open active bucket: {}", e);
            report.failures += 1;
            return;
        }
    };

    let keys = match bucket.keys().await {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!(bucket = %name, "failed to list entries: {}", e);
            report.failures += 1;
            return;
        }
    };

    for key in keys {
        let stored = match bucket.get(&key).await {
            Ok(Some(stored)) => stored,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(bucket = %name, key = %key, "failed to read entry: {}", e);
                report.failures += 1;
                continue;
            }
        };

        if is_active(&stored, now_ms) {
            continue;
        }

        match bucket.delete(&key).await {
            Ok(true) => report.entries_removed += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(bucket = %name, key = %key, "failed to delete expired entry: {}", e);
                report.failures += 1;
            }
        }
    }
}
