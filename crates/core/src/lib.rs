//! Core of swcache, an expiry-aware HTTP response cache.
//!
//! This crate provides:
//! - Policy table and URL-based policy resolution
//! - Freshness checks against an embedded expiry header
//! - The cache read/write path and the activation sweep
//! - Bucket storage with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod freshness;
pub mod policy;
pub mod request;
pub mod response;
pub mod sweep;

pub use cache::{CacheBucket, CacheDb, CacheStorage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use engine::{CacheEngine, Served, Source, WriteMode};
pub use error::Error;
pub use fetch::Fetcher;
pub use freshness::{EXPIRES_HEADER, is_active};
pub use policy::{CachePolicy, PolicyConfig, PolicyTable};
pub use request::CacheRequest;
pub use response::{LiveResponse, StoredResponse, live_response_to_stored};
pub use sweep::{SweepReport, sweep};
