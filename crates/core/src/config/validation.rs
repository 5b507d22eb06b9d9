//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use crate::config::AppConfig;
use crate::policy::PolicyTable;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_prefix`, `cache_version` or `user_agent` is empty
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - a policy has an empty or duplicated name, no patterns, or an invalid pattern
    ///
    /// Returns `ConfigError::Missing` if no policies are configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_prefix.is_empty() {
            return Err(ConfigError::Invalid { field: "cache_prefix".into(), reason: "must not be empty".into() });
        }
        if self.cache_version.is_empty() {
            return Err(ConfigError::Invalid { field: "cache_version".into(), reason: "must not be empty".into() });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        self.validate_policies()
    }

    fn validate_policies(&self) -> Result<(), ConfigError> {
        if self.policies.is_empty() {
            return Err(ConfigError::Missing {
                field: "policies".into(),
                hint: "Declare at least one [[policies]] entry".into(),
            });
        }

        let mut seen = HashSet::new();
        for policy in &self.policies {
            if policy.name.is_empty() {
                return Err(ConfigError::Invalid { field: "policies.name".into(), reason: "must not be empty".into() });
            }
            if !seen.insert(policy.name.as_str()) {
                return Err(ConfigError::Invalid {
                    field: format!("policies.{}", policy.name),
                    reason: "duplicated policy name".into(),
                });
            }
            if policy.patterns.is_empty() {
                return Err(ConfigError::Invalid {
                    field: format!("policies.{}.patterns", policy.name),
                    reason: "must declare at least one pattern".into(),
                });
            }
            if policy.expiry_ms <= 0 {
                tracing::warn!(
                    policy = %policy.name,
                    expiry_ms = policy.expiry_ms,
                    "non-positive expiry; entries under this policy are stored already expired"
                );
            }
        }

        let table = PolicyTable::from_config(&self.policies)?;
        if table.resolve("/").is_none() || table.resolve("/any/path").is_none() {
            tracing::warn!("no catch-all policy; unmatched requests bypass the cache");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyConfig;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_prefix() {
        let config = AppConfig { cache_prefix: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_prefix"));
    }

    #[test]
    fn test_validate_empty_version() {
        let config = AppConfig { cache_version: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_version"));
    }

    #[test]
    fn test_validate_max_bytes_zero() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_bytes"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_no_policies() {
        let config = AppConfig { policies: Vec::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Missing { field, .. }) if field == "policies"));
    }

    #[test]
    fn test_validate_duplicate_policy_names() {
        let config = AppConfig {
            policies: vec![PolicyConfig::new("a", 1, &["^/a"]), PolicyConfig::new("a", 2, &[".*"])],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "policies.a"));
    }

    #[test]
    fn test_validate_policy_without_patterns() {
        let config = AppConfig { policies: vec![PolicyConfig::new("empty", 1, &[])], ..Default::default() };
        assert!(
            matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "policies.empty.patterns")
        );
    }

    #[test]
    fn test_validate_invalid_regex() {
        let config = AppConfig { policies: vec![PolicyConfig::new("bad", 1, &["[z-a]"])], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_allows_non_positive_expiry_and_missing_catch_all() {
        let config = AppConfig {
            policies: vec![PolicyConfig::new("off", 0, &["^/api/.*"]), PolicyConfig::new("neg", -1, &["^/tmp/"])],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
