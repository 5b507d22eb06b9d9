//! Network client for swcache.
//!
//! This crate provides the HTTP implementation of the engine's network
//! fetch primitive.

pub mod fetch;

pub use fetch::{FetchConfig, HttpFetcher};
