//! Cache policy table and URL-based policy resolution.
//!
//! A [`PolicyTable`] is an ordered list of [`CachePolicy`] rules. Resolution
//! strips the scheme and host from a URL and returns the first policy (in
//! declaration order) owning a matcher that accepts the remaining path.
//! Query strings and fragments stay part of the matched path.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Convert whole days to milliseconds.
pub const fn days_to_millis(days: i64) -> i64 {
    days * DAY_MILLIS
}

/// Convert whole seconds to milliseconds.
pub const fn seconds_to_millis(seconds: i64) -> i64 {
    seconds * 1000
}

/// Serializable description of a single policy, as found in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Policy name, used in logs and tool output.
    pub name: String,
    /// Time-to-live for entries written under this policy.
    ///
    /// Zero or negative values make every stored entry immediately expired.
    pub expiry_ms: i64,
    /// Ordered path patterns (regular expressions).
    pub patterns: Vec<String>,
}

impl PolicyConfig {
    pub fn new(name: impl Into<String>, expiry_ms: i64, patterns: &[&str]) -> Self {
        Self { name: name.into(), expiry_ms, patterns: patterns.iter().map(|p| p.to_string()).collect() }
    }
}

/// Built-in policy table.
pub fn default_policies() -> Vec<PolicyConfig> {
    vec![
        PolicyConfig::new("long-cache", days_to_millis(90), &["^/javascript/.*", "^/images/.*", "^/css/.*"]),
        PolicyConfig::new("medium-cache", days_to_millis(1), &["^/$", ".*/tag/.*"]),
        PolicyConfig::new("default-cache", days_to_millis(7), &[".*"]),
    ]
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    regex: Regex,
}

impl PathMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self { regex: Regex::new(pattern)? })
    }

    /// Test a normalized path.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// A cache rule: name, expiry and ordered matchers.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    name: String,
    expiry_ms: i64,
    matchers: Vec<PathMatcher>,
}

impl CachePolicy {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expiry_ms(&self) -> i64 {
        self.expiry_ms
    }

    pub fn matchers(&self) -> &[PathMatcher] {
        &self.matchers
    }

    /// Absolute expiry for an entry written at `now_ms`.
    pub fn expires_at(&self, now_ms: i64) -> i64 {
        now_ms.saturating_add(self.expiry_ms)
    }

    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

/// Immutable, ordered policy table.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    policies: Vec<CachePolicy>,
}

impl PolicyTable {
    /// Compile a table from configuration, preserving declaration order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if any pattern fails to compile.
    pub fn from_config(configs: &[PolicyConfig]) -> Result<Self, ConfigError> {
        let mut policies = Vec::with_capacity(configs.len());
        for config in configs {
            let matchers = config
                .patterns
                .iter()
                .map(|pattern| {
                    PathMatcher::new(pattern).map_err(|e| ConfigError::Invalid {
                        field: format!("policies.{}.patterns", config.name),
                        reason: e.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            policies.push(CachePolicy { name: config.name.clone(), expiry_ms: config.expiry_ms, matchers });
        }
        Ok(Self { policies })
    }

    pub fn policies(&self) -> &[CachePolicy] {
        &self.policies
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Resolve the policy for a request URL.
    ///
    /// `None` means the request bypasses the cache.
    pub fn resolve(&self, url: &str) -> Option<&CachePolicy> {
        let path = request_path(url);
        let policy = self.policies.iter().find(|p| p.matches(path));
        if let Some(policy) = policy {
            tracing::debug!(path, policy = policy.name(), expiry_ms = policy.expiry_ms(), "resolved cache policy");
        }
        policy
    }
}

/// Strip an `http://` or `https://` prefix (any case) and the host, keeping
/// everything from the first `/` on. A URL without a path maps to `/`.
pub fn request_path(url: &str) -> &str {
    let rest = ["https://", "http://"]
        .iter()
        .find(|scheme| url.get(..scheme.len()).is_some_and(|head| head.eq_ignore_ascii_case(scheme)))
        .map_or(url, |scheme| &url[scheme.len()..]);
    match rest.find('/') {
        Some(idx) => &rest[idx..],
        None => "/",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_table() -> PolicyTable {
        PolicyTable::from_config(&default_policies()).unwrap()
    }

    #[test]
    fn test_request_path_strips_scheme_and_host() {
        assert_eq!(request_path("https://example.com/images/a.png"), "/images/a.png");
        assert_eq!(request_path("http://example.com/images/a.png"), "/images/a.png");
        assert_eq!(request_path("https://example.com:8080/"), "/");
    }

    #[test]
    fn test_request_path_keeps_query_and_fragment() {
        assert_eq!(request_path("https://example.com/a?b=1#c"), "/a?b=1#c");
    }

    #[test]
    fn test_request_path_scheme_is_case_insensitive() {
        assert_eq!(request_path("HTTPS://example.com/images/logo.png"), "/images/logo.png");
        assert_eq!(request_path("Http://example.com/css/a.css"), "/css/a.css");
    }

    #[test]
    fn test_request_path_without_path() {
        assert_eq!(request_path("https://example.com"), "/");
    }

    #[test]
    fn test_request_path_already_relative() {
        assert_eq!(request_path("/css/site.css"), "/css/site.css");
    }

    #[test]
    fn test_first_match_wins_over_catch_all() {
        let table = default_table();
        let policy = table.resolve("https://example.com/images/logo.png").unwrap();
        assert_eq!(policy.name(), "long-cache");
        assert_eq!(policy.expiry_ms(), days_to_millis(90));
    }

    #[test]
    fn test_root_and_tag_pages_are_medium() {
        let table = default_table();
        assert_eq!(table.resolve("https://example.com/").unwrap().name(), "medium-cache");
        assert_eq!(table.resolve("https://example.com").unwrap().name(), "medium-cache");
        assert_eq!(table.resolve("https://example.com/blog/tag/rust").unwrap().name(), "medium-cache");
    }

    #[test]
    fn test_catch_all_default() {
        let table = default_table();
        let policy = table.resolve("https://example.com/2020/01/some-post.html").unwrap();
        assert_eq!(policy.name(), "default-cache");
    }

    #[test]
    fn test_anchored_pattern_does_not_match_nested_path() {
        let table = default_table();
        assert_eq!(table.resolve("https://example.com/blog/images/x.png").unwrap().name(), "default-cache");
    }

    #[test]
    fn test_no_catch_all_returns_none() {
        let table = PolicyTable::from_config(&[PolicyConfig::new("static", days_to_millis(90), &["^/static/.*"])])
            .unwrap();
        assert!(table.resolve("https://example.com/unknown").is_none());
        assert!(table.resolve("https://example.com/static/app.js").is_some());
    }

    #[test]
    fn test_declaration_order_decides_ties() {
        let table = PolicyTable::from_config(&[
            PolicyConfig::new("first", 1, &["^/a"]),
            PolicyConfig::new("second", 2, &["^/a/b"]),
        ])
        .unwrap();
        assert_eq!(table.resolve("http://h/a/b").unwrap().name(), "first");
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let result = PolicyTable::from_config(&[PolicyConfig::new("bad", 1, &["(unclosed"])]);
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "policies.bad.patterns"));
    }

    #[test]
    fn test_expires_at() {
        let table = default_table();
        let policy = table.resolve("https://example.com/css/a.css").unwrap();
        assert_eq!(policy.expires_at(1_000), 1_000 + days_to_millis(90));
    }

    #[test]
    fn test_time_helpers() {
        assert_eq!(days_to_millis(1), 86_400_000);
        assert_eq!(seconds_to_millis(3), 3_000);
    }
}
