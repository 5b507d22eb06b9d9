//! Cache read/write path.
//!
//! For every intercepted request the engine:
//!
//! 1. opens the active bucket and looks up the request key
//! 2. resolves the policy for the request URL
//! 3. serves an active stored entry verbatim, without touching the network
//! 4. otherwise fetches, stamps the response with `now + expiry` and upserts it
//!
//! Store failures never reach the caller: a failed read is a miss and a
//! failed write is logged. Network failures propagate unchanged and leave the
//! bucket untouched. Requests without a policy bypass the cache entirely.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::cache::{CacheBucket, CacheStorage};
use crate::clock::{Clock, SystemClock};
use crate::fetch::Fetcher;
use crate::freshness::is_active;
use crate::policy::{CachePolicy, PolicyTable};
use crate::request::CacheRequest;
use crate::response::{LiveResponse, StoredResponse, live_response_to_stored};
use crate::sweep::{SweepReport, sweep};

/// How fetched responses are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Wait for the upsert before returning the response.
    #[default]
    Await,
    /// Spawn the upsert and return immediately.
    Detached,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Active entry from the bucket.
    Cache,
    /// Fetched and stored.
    Network,
    /// Fetched, not stored (no policy or no bucket).
    Bypass,
}

/// A response handed back to the intercepting caller.
#[derive(Debug)]
pub struct Served {
    pub response: LiveResponse,
    pub source: Source,
}

/// Expiry-aware caching engine.
pub struct CacheEngine<S: CacheStorage, F: Fetcher> {
    storage: S,
    fetcher: F,
    policies: PolicyTable,
    bucket_name: String,
    clock: Arc<dyn Clock>,
    write_mode: WriteMode,
}

impl<S: CacheStorage, F: Fetcher> CacheEngine<S, F> {
    pub fn new(storage: S, fetcher: F, policies: PolicyTable, bucket_name: impl Into<String>) -> Self {
        Self {
            storage,
            fetcher,
            policies,
            bucket_name: bucket_name.into(),
            clock: Arc::new(SystemClock),
            write_mode: WriteMode::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Resolve the policy that applies to `url`.
    pub fn resolve(&self, url: &str) -> Option<&CachePolicy> {
        self.policies.resolve(url)
    }

    /// Produce a response for an intercepted request.
    ///
    /// # Errors
    ///
    /// Only network failures are returned.
    pub async fn intercept(&self, request: &CacheRequest) -> Result<Served, Error> {
        let bucket = match self.storage.open(&self.bucket_name).await {
            Ok(bucket) => Some(bucket),
            Err(e) => {
                tracing::warn!(bucket = %self.bucket_name, "failed to open bucket: {}", e);
                None
            }
        };

        let cached = match &bucket {
            Some(bucket) => self.lookup(bucket, request).await,
            None => None,
        };

        let policy = self.policies.resolve(request.policy_url());

        if let Some(stored) = cached {
            if is_active(&stored, self.clock.now_millis()) {
                tracing::debug!(url = request.url(), "serving from cache");
                return Ok(Served { response: stored.into_live(), source: Source::Cache });
            }
            tracing::debug!(url = request.url(), "cached entry is expired");
        }

        tracing::debug!(url = request.url(), "no active match in cache, using network");
        let live = self.fetcher.fetch(request).await?;

        let (Some(policy), Some(bucket)) = (policy, bucket) else {
            return Ok(Served { response: live, source: Source::Bypass });
        };

        let expires_at = policy.expires_at(self.clock.now_millis());
        let (returned, persisted) = live.tee();
        let stored = live_response_to_stored(persisted, expires_at);
        self.persist(bucket, request, stored).await;

        Ok(Served { response: returned, source: Source::Network })
    }

    /// Run the activation sweep for the active generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket names cannot be listed.
    pub async fn activate(&self) -> Result<SweepReport, Error> {
        sweep(&self.storage, &self.bucket_name, self.clock.now_millis()).await
    }

    async fn lookup(&self, bucket: &S::Bucket, request: &CacheRequest) -> Option<StoredResponse> {
        match bucket.get(&request.key()).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(url = request.url(), "cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    async fn persist(&self, bucket: S::Bucket, request: &CacheRequest, stored: StoredResponse) {
        match self.write_mode {
            WriteMode::Await => {
                if let Err(e) = bucket.put(request, &stored).await {
                    tracing::warn!(url = request.url(), "failed to cache response: {}", e);
                }
            }
            WriteMode::Detached => {
                let request = request.clone();
                tokio::spawn(async move {
                    if let Err(e) = bucket.put(&request, &stored).await {
                        tracing::warn!(url = request.url(), "failed to cache response: {}", e);
                    }
                });
            }
        }
    }
}
