//! cache_fetch tool implementation.
//!
//! Routes a request through the cache engine: active entries are served from
//! the bucket, everything else goes to the network.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{CacheRequest, EXPIRES_HEADER, Source};

use crate::tools::{Engine, json_result};

/// Parameters for the cache_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheFetchParams {
    /// The URL to fetch.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheFetchOutput {
    /// Canonical request URL.
    pub url: String,
    /// Where the response came from.
    pub source: Source,
    /// HTTP status code.
    pub status: u16,
    /// HTTP status text.
    pub status_text: String,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Absolute expiry (epoch ms) when served from cache.
    pub expires_at: Option<i64>,
    /// Response body, lossily decoded as UTF-8.
    pub body: String,
}

/// Implementation of the cache_fetch tool.
pub async fn fetch_impl(engine: &Engine, params: CacheFetchParams) -> Result<CallToolResult, McpError> {
    let request = CacheRequest::new(&params.method, &params.url)?;
    let served = engine.intercept(&request).await?;

    let response = served.response;
    let status = response.status();
    let status_text = response.status_text().to_string();
    let headers = response.headers().clone();
    let expires_at = headers.get(EXPIRES_HEADER).and_then(|v| v.parse().ok());
    let body = String::from_utf8_lossy(&response.into_body()).to_string();

    let output = CacheFetchOutput {
        url: request.url().to_string(),
        source: served.source,
        status,
        status_text,
        headers,
        expires_at,
        body,
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{BUCKET, engine, text_of};
    use swcache_core::{CacheBucket, CacheStorage, LiveResponse, live_response_to_stored};

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let engine = engine().await;
        let params = CacheFetchParams { url: "ftp://example.com/file".into(), method: "GET".into() };

        let result = fetch_impl(&engine, params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_served_from_cache() {
        let engine = engine().await;
        let request = CacheRequest::get("https://example.com/css/site.css").unwrap();
        let stored = live_response_to_stored(
            LiveResponse::new(200, "OK", "body{}").with_header("content-type", "text/css"),
            i64::MAX,
        );
        let bucket = engine.storage().open(BUCKET).await.unwrap();
        bucket.put(&request, &stored).await.unwrap();

        let params = CacheFetchParams { url: "https://example.com/css/site.css".into(), method: "GET".into() };
        let result = fetch_impl(&engine, params).await.unwrap();

        let output: CacheFetchOutput = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(output.source, Source::Cache);
        assert_eq!(output.status, 200);
        assert_eq!(output.body, "body{}");
        assert_eq!(output.expires_at, Some(i64::MAX));
        assert_eq!(output.headers.get("content-type").map(String::as_str), Some("text/css"));
    }

    #[tokio::test]
    async fn test_fetch_network_failure_is_error() {
        let engine = engine().await;
        let params = CacheFetchParams { url: "http://127.0.0.1:9/".into(), method: "GET".into() };

        let result = fetch_impl(&engine, params).await;
        assert!(result.is_err());
    }
}
