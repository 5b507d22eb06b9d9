//! Cache bucket storage.
//!
//! The engine talks to storage through two traits:
//!
//! - [`CacheStorage`] opens, lists and deletes named buckets
//! - [`CacheBucket`] maps request keys to at most one [`StoredResponse`]
//!
//! Each individual operation is atomic; sequences of operations are not.
//! [`CacheDb`] is the SQLite implementation (async access via tokio-rusqlite,
//! schema migrations, WAL mode).

pub mod buckets;
pub mod connection;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use buckets::SqliteBucket;
pub use connection::CacheDb;

use crate::request::CacheRequest;
use crate::response::StoredResponse;

/// A store of named cache buckets.
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    type Bucket: CacheBucket;

    /// Open a bucket, creating it if it does not exist.
    async fn open(&self, name: &str) -> Result<Self::Bucket, Error>;

    /// Names of all existing buckets, in creation order.
    async fn bucket_names(&self) -> Result<Vec<String>, Error>;

    /// Delete a bucket and everything in it. Returns false if it did not exist.
    async fn delete_bucket(&self, name: &str) -> Result<bool, Error>;
}

/// A single named bucket.
#[async_trait::async_trait]
pub trait CacheBucket: Clone + Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Look up the entry for a request key.
    async fn get(&self, key: &str) -> Result<Option<StoredResponse>, Error>;

    /// Insert or replace the entry for a request.
    async fn put(&self, request: &CacheRequest, response: &StoredResponse) -> Result<(), Error>;

    /// Delete the entry for a request key. Returns false if there was none.
    async fn delete(&self, key: &str) -> Result<bool, Error>;

    /// Keys of all entries currently in the bucket.
    async fn keys(&self) -> Result<Vec<String>, Error>;
}
