//! Configuration Module
//!
//! Handles loading and validating cache construction parameters, either from
//! environment variables or from any serde-supported document.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::{DEFAULT_BUCKET_COUNT, DEFAULT_EXPIRE_MS, DEFAULT_MAX_SIZE};
use crate::error::{CacheError, Result};

/// Cache construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry count above which the eviction policy starts recycling nodes
    pub max_size: usize,
    /// Number of hash chains; fixed for the lifetime of the cache
    pub bucket_count: usize,
    /// Freshness window in milliseconds (timed variants only)
    pub expire_ms: u64,
    /// Hard ceiling on allocated nodes, None = bounded only by memory
    pub node_limit: Option<usize>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_MAX_SIZE` - Soft entry bound (default: 1024)
    /// - `LRU_BUCKET_COUNT` - Hash chain count (default: 32)
    /// - `LRU_EXPIRE_MS` - Freshness window in milliseconds (default: 60000)
    /// - `LRU_NODE_LIMIT` - Hard node ceiling (default: unset)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`CacheConfig::from_env`] but reads variables through `lookup`.
    ///
    /// Unparsable values fall back to the default for that field.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            max_size: lookup("LRU_MAX_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_size),
            bucket_count: lookup("LRU_BUCKET_COUNT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bucket_count),
            expire_ms: lookup("LRU_EXPIRE_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.expire_ms),
            node_limit: lookup("LRU_NODE_LIMIT").and_then(|v| v.parse().ok()),
        }
    }

    // == Validate ==
    /// Rejects parameters no cache can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.bucket_count == 0 {
            return Err(CacheError::InvalidConfig(
                "bucket_count must be greater than zero".to_string(),
            ));
        }
        if let Some(limit) = self.node_limit {
            if limit < self.max_size {
                return Err(CacheError::InvalidConfig(format!(
                    "node_limit {} is below max_size {}",
                    limit, self.max_size
                )));
            }
        }
        Ok(())
    }

    /// Freshness window as a [`Duration`].
    pub fn expire(&self) -> Duration {
        Duration::from_millis(self.expire_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            bucket_count: DEFAULT_BUCKET_COUNT,
            expire_ms: DEFAULT_EXPIRE_MS,
            node_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_size, 1024);
        assert_eq!(config.bucket_count, 32);
        assert_eq!(config.expire_ms, 60_000);
        assert_eq!(config.node_limit, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = CacheConfig::from_lookup(|_| None);
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_config_from_lookup_values() {
        let vars: HashMap<&str, &str> = [
            ("LRU_MAX_SIZE", "64"),
            ("LRU_BUCKET_COUNT", "16"),
            ("LRU_EXPIRE_MS", "250"),
            ("LRU_NODE_LIMIT", "128"),
        ]
        .into_iter()
        .collect();

        let config = CacheConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.max_size, 64);
        assert_eq!(config.bucket_count, 16);
        assert_eq!(config.expire(), Duration::from_millis(250));
        assert_eq!(config.node_limit, Some(128));
    }

    #[test]
    fn test_config_unparsable_falls_back() {
        let config = CacheConfig::from_lookup(|name| match name {
            "LRU_MAX_SIZE" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config.max_size, 1024);
    }

    #[test]
    fn test_config_validate_rejects_zeroes() {
        let config = CacheConfig {
            max_size: 0,
            ..CacheConfig::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = CacheConfig {
            bucket_count: 0,
            ..CacheConfig::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_validate_node_limit_below_max() {
        let config = CacheConfig {
            max_size: 10,
            node_limit: Some(5),
            ..CacheConfig::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_partial_json() {
        let config: CacheConfig = serde_json::from_str(r#"{"max_size": 8}"#).unwrap();
        assert_eq!(config.max_size, 8);
        assert_eq!(config.bucket_count, 32);
    }
}
