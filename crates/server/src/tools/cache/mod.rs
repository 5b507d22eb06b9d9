//! Cache-related MCP tools.
//!
//! `cache_fetch` is the interception entry point; `cache_policy` and
//! `cache_sweep` expose policy resolution and the activation sweep.

pub mod fetch;
pub mod policy;
pub mod sweep;

pub use fetch::{CacheFetchParams, fetch_impl};
pub use policy::{CachePolicyParams, policy_impl};
pub use sweep::{CacheSweepParams, sweep_impl};
