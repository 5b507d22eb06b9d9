//! cache_policy tool implementation.
//!
//! Reports which policy a URL resolves to, without fetching anything.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::CacheRequest;
use swcache_core::policy::request_path;

use crate::tools::{Engine, json_result};

/// Parameters for the cache_policy tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePolicyParams {
    /// The URL to resolve.
    pub url: String,
}

/// A resolved policy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PolicyInfo {
    pub name: String,
    pub expiry_ms: i64,
}

/// Output from the cache_policy tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePolicyOutput {
    /// The path the patterns were tested against.
    pub path: String,
    /// Matching policy, or null when the URL bypasses the cache.
    pub policy: Option<PolicyInfo>,
}

/// Implementation of the cache_policy tool.
pub async fn policy_impl(engine: &Engine, params: CachePolicyParams) -> Result<CallToolResult, McpError> {
    let request = CacheRequest::get(&params.url)?;
    let policy = engine
        .resolve(request.policy_url())
        .map(|p| PolicyInfo { name: p.name().to_string(), expiry_ms: p.expiry_ms() });

    let output = CachePolicyOutput { path: request_path(request.policy_url()).to_string(), policy };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{engine, text_of};
    use swcache_core::policy::days_to_millis;

    async fn resolve(url: &str) -> CachePolicyOutput {
        let engine = engine().await;
        let result = policy_impl(&engine, CachePolicyParams { url: url.into() }).await.unwrap();
        serde_json::from_str(&text_of(&result)).unwrap()
    }

    #[tokio::test]
    async fn test_policy_long_cache() {
        let output = resolve("https://example.com/images/logo.png").await;
        assert_eq!(output.path, "/images/logo.png");
        let policy = output.policy.unwrap();
        assert_eq!(policy.name, "long-cache");
        assert_eq!(policy.expiry_ms, days_to_millis(90));
    }

    #[tokio::test]
    async fn test_policy_default_cache() {
        let output = resolve("https://example.com/about?lang=sv").await;
        assert_eq!(output.path, "/about?lang=sv");
        assert_eq!(output.policy.unwrap().name, "default-cache");
    }

    #[tokio::test]
    async fn test_policy_agrees_with_intercept_normalization() {
        let output = resolve("HTTPS://Example.com/images/logo.png").await;
        assert_eq!(output.path, "/images/logo.png");
        assert_eq!(output.policy.unwrap().name, "long-cache");

        let output = resolve("https://example.com/post#/tag/x").await;
        assert_eq!(output.path, "/post#/tag/x");
        assert_eq!(output.policy.unwrap().name, "medium-cache");
    }

    #[tokio::test]
    async fn test_policy_invalid_url() {
        let engine = engine().await;
        let result = policy_impl(&engine, CachePolicyParams { url: "ftp://example.com/a".into() }).await;
        assert!(result.is_err());
    }
}
