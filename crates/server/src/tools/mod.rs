//! MCP tool implementations.
//!
//! This module contains all tools exposed by the swcache server.

pub mod cache;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use swcache_client::HttpFetcher;
use swcache_core::{CacheDb, CacheEngine, Error};

/// Engine hosted by the server.
pub type Engine = CacheEngine<CacheDb, HttpFetcher>;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
