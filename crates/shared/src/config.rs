//! Configuration types for Waypoint

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use waypoint_domain::RetryPolicy;

use crate::{Result, WaypointError};

/// Overrides `retry.maxRetries`
pub const ENV_MAX_RETRIES: &str = "WAYPOINT_MAX_RETRIES";
/// Overrides `retry.backoffDelayMs`
pub const ENV_BACKOFF_MS: &str = "WAYPOINT_BACKOFF_MS";

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaypointConfig {
    pub retry: RetryConfig,
    pub audit: AuditConfig,
    pub upstream: UpstreamConfig,
}

/// Retry budget for get-by-id lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries(),
            backoff_delay_ms: policy.backoff_delay().as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.backoff_delay_ms))
    }
}

/// Call log settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditConfig {
    /// Entries kept before the oldest is evicted
    pub capacity: usize,
    pub mirror_to_tracing: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            mirror_to_tracing: false,
        }
    }
}

/// Simulated upstream settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamConfig {
    /// JSON catalog to serve instead of the built-in sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    pub latency_ms: u64,
    /// Number of initial calls that fail transiently
    pub fail_first: u32,
}

impl UpstreamConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl WaypointConfig {
    /// Load configuration from a file
    ///
    /// `.yaml` and `.yml` files are parsed as YAML, anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config: Self = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_str_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.audit.capacity == 0 {
            return Err(WaypointError::Config(
                "audit.capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `WAYPOINT_*` overrides from the process environment
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_MAX_RETRIES) {
            self.retry.max_retries = parse_override(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = lookup(ENV_BACKOFF_MS) {
            self.retry.backoff_delay_ms = parse_override(ENV_BACKOFF_MS, &value)?;
        }
        Ok(())
    }
}

fn parse_override<T: std::str::FromStr>(var: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| WaypointError::InvalidOverride {
            var: var.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_domain_policy() {
        let config = WaypointConfig::default();
        assert_eq!(config.retry.to_policy(), RetryPolicy::default());
        assert_eq!(config.audit.capacity, 1000);
        assert!(config.upstream.catalog_path.is_none());
    }

    #[test]
    fn test_config_parse() {
        let json = r#"{
            "retry": { "maxRetries": 4, "backoffDelayMs": 250 },
            "upstream": { "catalogPath": "sites.json", "failFirst": 1 }
        }"#;

        let config = WaypointConfig::from_str_json(json).unwrap();
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(
            config.retry.to_policy().backoff_delay(),
            Duration::from_millis(250)
        );
        assert_eq!(
            config.upstream.catalog_path.as_deref(),
            Some(Path::new("sites.json"))
        );
        assert_eq!(config.upstream.fail_first, 1);
        // Missing sections fall back to defaults
        assert_eq!(config.audit, AuditConfig::default());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = WaypointConfig::from_str_json(r#"{ "audit": { "capacity": 0 } }"#).unwrap_err();
        assert!(matches!(err, WaypointError::Config(_)));
    }

    #[test]
    fn test_from_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "retry": {{ "maxRetries": 0 }} }}"#).unwrap();

        let config = WaypointConfig::from_file(file.path()).unwrap();
        assert_eq!(config.retry.to_policy().max_attempts(), 1);
    }

    #[test]
    fn test_from_file_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "retry:\n  maxRetries: 5\naudit:\n  mirrorToTracing: true").unwrap();

        let config = WaypointConfig::from_file(file.path()).unwrap();
        assert_eq!(config.retry.max_retries, 5);
        assert!(config.audit.mirror_to_tracing);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = WaypointConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, WaypointError::Io(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = WaypointConfig::default();
        config
            .apply_env_overrides(env(&[(ENV_MAX_RETRIES, "7"), (ENV_BACKOFF_MS, " 20 ")]))
            .unwrap();

        assert_eq!(
            config.retry.to_policy(),
            RetryPolicy::new(7, Duration::from_millis(20))
        );
    }

    #[test]
    fn test_invalid_env_override() {
        let mut config = WaypointConfig::default();
        let err = config
            .apply_env_overrides(env(&[(ENV_MAX_RETRIES, "lots")]))
            .unwrap_err();

        assert!(matches!(
            err,
            WaypointError::InvalidOverride { ref var, .. } if var == ENV_MAX_RETRIES
        ));
        assert_eq!(config.retry, RetryConfig::default());
    }
}
