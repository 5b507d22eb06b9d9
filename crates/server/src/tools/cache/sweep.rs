//! cache_sweep tool implementation.
//!
//! Re-runs the activation sweep: expired entries of the active generation and
//! every bucket of another generation are deleted.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{Engine, json_result};

/// Parameters for the cache_sweep tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheSweepParams {}

/// Implementation of the cache_sweep tool.
pub async fn sweep_impl(engine: &Engine, _params: CacheSweepParams) -> Result<CallToolResult, McpError> {
    let report = engine.activate().await?;
    json_result(&report)
}
