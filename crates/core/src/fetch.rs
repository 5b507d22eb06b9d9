//! Network fetch primitive.

use std::sync::Arc;

use crate::Error;
use crate::request::CacheRequest;
use crate::response::LiveResponse;

/// Sends a request to the network.
///
/// Any HTTP status counts as success; only transport failures are errors.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &CacheRequest) -> Result<LiveResponse, Error>;
}

#[async_trait::async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, request: &CacheRequest) -> Result<LiveResponse, Error> {
        (**self).fetch(request).await
    }
}
